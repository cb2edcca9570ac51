mod scenario_tests;
mod toolchain_tests;
