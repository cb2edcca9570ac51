//! Common test utilities shared across integration and E2E tests

use std::path::Path;
use std::process::{Command, Stdio};

use proctor_sandbox::{HeuristicConfig, SandboxConfig, SandboxService};

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("proctor_sandbox=debug,proctor_eval=debug")
        .with_test_writer()
        .try_init();
}

/// `true` if `program --version` runs and exits zero.
pub fn toolchain_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Return early from a test when a toolchain is not installed.
macro_rules! require_toolchain {
    ($program:expr) => {
        if !$crate::common::toolchain_available($program) {
            eprintln!("skipping: {} not installed", $program);
            return;
        }
    };
}

/// Config rooted at `root` with the heuristic delay switched off.
pub fn test_config(root: &Path) -> SandboxConfig {
    SandboxConfig {
        workspace_root: root.to_path_buf(),
        heuristics: HeuristicConfig::immediate(),
        ..SandboxConfig::default()
    }
}

pub fn test_service(root: &Path) -> SandboxService {
    SandboxService::new(&test_config(root))
}

/// Entries left under a workspace root.
pub fn remaining_workspaces(root: &Path) -> usize {
    std::fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
}
