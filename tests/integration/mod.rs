mod concurrency_tests;
mod evaluator_tests;
mod lifecycle_tests;
