//! End-to-end scenarios through the public service API

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use proctor_common::{ExecutionPhase, Submission};
use proctor_sandbox::{SandboxError, SandboxService};

use crate::common::{remaining_workspaces, setup_test_logging, test_config, test_service};

#[tokio::test]
async fn test_javascript_prints_sum() {
    require_toolchain!("node");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let result = service
        .execute(Submission::new("javascript", "console.log(2+2)"))
        .await
        .unwrap();
    assert!(result.success, "{:?}", result.error);
    assert!(result.output.unwrap().contains('4'));
    assert!(result.error.is_none());
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_python_division_by_zero() {
    require_toolchain!("python3");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let result = service
        .execute(Submission::new("python", "print(1/0)"))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.phase, Some(ExecutionPhase::Run));
    assert!(result.error.unwrap().contains("ZeroDivisionError"));
    assert!(result.output.is_none());
}

#[tokio::test]
async fn test_unsupported_language_has_no_side_effects() {
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let started = Instant::now();
    let err = service
        .execute(Submission::new("ruby", "puts 1"))
        .await
        .unwrap_err();
    assert_matches!(err, SandboxError::UnsupportedLanguage(ref id) if id == "ruby");
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(service.workspaces().created_count(), 0);
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_cpp_infinite_loop_times_out() {
    require_toolchain!("g++");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path());
    config.limits.execution_timeout = Duration::from_secs(2);
    let service = SandboxService::new(&config);

    let code = "int main() { volatile unsigned long n = 0; for (;;) { n++; } }";
    let started = Instant::now();
    let result = service.execute(Submission::new("cpp", code)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Execution timeout"));
    assert_eq!(result.phase, Some(ExecutionPhase::Run));
    assert!(result.execution_time_ms >= 2000);
    // Compile time plus kill grace.
    assert!(started.elapsed() < Duration::from_secs(2) + config.limits.compile_timeout);
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_html_fragment_names_missing_structure() {
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let result = service
        .execute(Submission::new("html", "<p>hi</p>"))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.phase, Some(ExecutionPhase::Validate));
    let error = result.error.unwrap();
    assert!(error.contains("<!DOCTYPE html>"), "{}", error);
    assert!(error.contains("<html"), "{}", error);
}

#[tokio::test]
async fn test_result_wire_format() {
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let result = service
        .execute(Submission::new("html", "<p>hi</p>"))
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["phase"], "validate");
    assert!(json["executionTime"].is_u64());
    assert!(json.get("output").is_none());
    assert!(json.get("aiEvaluation").is_none());
}
