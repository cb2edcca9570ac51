//! Run lifecycle with `sh` standing in for the python interpreter, so these
//! tests need no language toolchain.
#![cfg(unix)]

use std::time::{Duration, Instant};

use proctor_common::{ExecutionPhase, Submission, TestCase};
use proctor_sandbox::{CommandSpec, ExecutionStage, SandboxConfig, SandboxService};

use crate::common::{remaining_workspaces, setup_test_logging, test_config};

fn sh_config(root: &std::path::Path) -> SandboxConfig {
    let mut config = test_config(root);
    config.toolchains.python = CommandSpec::new("sh");
    config
}

#[tokio::test]
async fn test_busy_loop_is_killed_at_deadline() {
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let mut config = sh_config(root.path());
    config.limits.execution_timeout = Duration::from_millis(500);
    let service = SandboxService::new(&config);

    let started = Instant::now();
    let (result, trace) = service
        .execute_traced(Submission::new("python", "while :; do :; done"))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Execution timeout"));
    assert_eq!(result.phase, Some(ExecutionPhase::Run));
    assert!(result.output.is_none());
    assert!(result.execution_time_ms >= 500);
    assert!(started.elapsed() < Duration::from_millis(500) + Duration::from_secs(3));

    assert_eq!(trace.verdict(), Some(ExecutionStage::TimedOut));
    let stages = trace.stages();
    let timed_out = stages
        .iter()
        .position(|s| *s == ExecutionStage::TimedOut)
        .unwrap();
    assert_eq!(stages[timed_out + 1], ExecutionStage::WorkspaceDestroyed);
    assert_eq!(stages.last(), Some(&ExecutionStage::ResultReturned));
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_forked_children_die_with_the_run() {
    let root = tempfile::tempdir().unwrap();
    let mut config = sh_config(root.path());
    config.limits.execution_timeout = Duration::from_millis(300);
    let service = SandboxService::new(&config);

    let started = Instant::now();
    let result = service
        .execute(Submission::new("python", "sleep 30 & sleep 30; wait"))
        .await
        .unwrap();
    assert_eq!(result.error.as_deref(), Some("Execution timeout"));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_nonzero_exit_reports_stderr() {
    let root = tempfile::tempdir().unwrap();
    let service = SandboxService::new(&sh_config(root.path()));

    let result = service
        .execute(Submission::new("python", "echo partial; echo oops >&2; exit 3"))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("oops"));
    assert!(result.output.is_none());

    let result = service
        .execute(Submission::new("python", "exit 4"))
        .await
        .unwrap();
    assert_eq!(result.error.as_deref(), Some("Process exited with code 4"));
}

#[tokio::test]
async fn test_repeated_runs_are_deterministic() {
    let root = tempfile::tempdir().unwrap();
    let service = SandboxService::new(&sh_config(root.path()));

    let submissions = [
        Submission::new("python", "echo hello; echo world"),
        Submission::new("python", "echo bad >&2; exit 1"),
        Submission::new("html", "<p>hi</p>"),
        Submission::new("css", ".a { display: flex; }"),
    ];
    for submission in submissions {
        let first = service.execute(submission.clone()).await.unwrap();
        for _ in 0..3 {
            let again = service.execute(submission.clone()).await.unwrap();
            assert_eq!(again.success, first.success);
            assert_eq!(again.output, first.output);
            assert_eq!(again.error, first.error);
            assert_eq!(again.phase, first.phase);
        }
    }
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_test_cases_receive_stdin() {
    let root = tempfile::tempdir().unwrap();
    let service = SandboxService::new(&sh_config(root.path()));

    let submission = Submission::new("python", "read n; echo $((n + 1))")
        .with_test_case(TestCase::new("1", "2"))
        .with_test_case(TestCase::new("41\n", "42\n"))
        .with_test_case(TestCase::new("5", "7").describe("expected to fail"));

    let result = service.execute(submission).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("1 of 3 test cases failed"));
    assert_eq!(result.phase, Some(ExecutionPhase::Run));

    let tests = result.test_results.unwrap();
    assert!(tests[0].passed && tests[1].passed);
    assert!(!tests[2].passed);
    assert_eq!(tests[2].actual_output.as_deref(), Some("6\n"));
}

#[tokio::test]
async fn test_eager_reader_is_never_run_without_input() {
    let root = tempfile::tempdir().unwrap();
    let service = SandboxService::new(&sh_config(root.path()));

    // Fails outright on an empty stdin.
    let submission = Submission::new("python", "set -e\nread n\necho $((n * 2))")
        .with_test_case(TestCase::new("2", "4"))
        .with_test_case(TestCase::new("5", "10"));

    let result = service.execute(submission).await.unwrap();
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output.as_deref(), Some("4\n"));
    assert!(result.test_results.unwrap().iter().all(|t| t.passed));
}
