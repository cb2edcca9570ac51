//! Compiled languages and test cases against real toolchains

use proctor_common::{ExecutionPhase, Submission, TestCase};

use crate::common::{remaining_workspaces, setup_test_logging, test_service};

#[tokio::test]
async fn test_java_entry_class_is_detected() {
    require_toolchain!("javac");
    require_toolchain!("java");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let code = r#"
public class Solution {
    public static void main(String[] args) {
        System.out.println("hello from " + Solution.class.getSimpleName());
    }
}
"#;
    let result = service.execute(Submission::new("java", code)).await.unwrap();
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output.unwrap().trim(), "hello from Solution");
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_cpp_compile_error_is_reported_as_compile_phase() {
    require_toolchain!("g++");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let result = service
        .execute(Submission::new("cpp", "int main( { return 0; }"))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.phase, Some(ExecutionPhase::Compile));
    assert!(result.error.unwrap().contains("error"));
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_cpp_runs_after_successful_compile() {
    require_toolchain!("g++");
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let code = "#include <iostream>\nint main() { std::cout << 6 * 7 << std::endl; }";
    let result = service.execute(Submission::new("cpp", code)).await.unwrap();
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output.as_deref(), Some("42\n"));
}

#[tokio::test]
async fn test_python_test_cases() {
    require_toolchain!("python3");
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let code = "import sys\nfor line in sys.stdin:\n    print(int(line) * 2)\n";
    let submission = Submission::new("python", code)
        .with_test_case(TestCase::new("2", "4"))
        .with_test_case(TestCase::new("21\n", "42").describe("trailing newline"));

    let result = service.execute(submission).await.unwrap();
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output.as_deref(), Some("4\n"));
    let tests = result.test_results.unwrap();
    assert_eq!(tests.len(), 2);
    assert!(tests.iter().all(|t| t.passed));
    assert_eq!(tests[1].description.as_deref(), Some("trailing newline"));
}

#[tokio::test]
async fn test_failing_test_case_fails_the_submission() {
    require_toolchain!("python3");
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let code = "print(int(input()) + 1)\n";
    let submission = Submission::new("python", code)
        .with_test_case(TestCase::new("1", "2"))
        .with_test_case(TestCase::new("1", "3"))
        .with_test_case(TestCase::new("x", "0"));

    let result = service.execute(submission).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("2 of 3 test cases failed"));
    assert_eq!(result.failed_test_count(), 2);

    let tests = result.test_results.unwrap();
    assert!(tests[0].passed);
    assert_eq!(tests[1].actual_output.as_deref(), Some("2\n"));
    assert!(tests[2].error.as_deref().unwrap().contains("ValueError"));
}

#[tokio::test]
async fn test_input_reading_program_passes_its_cases() {
    require_toolchain!("python3");
    let root = tempfile::tempdir().unwrap();
    let service = test_service(root.path());

    let submission = Submission::new("python", "n = int(input())\nprint(n * 2)\n")
        .with_test_case(TestCase::new("2", "4"))
        .with_test_case(TestCase::new("5", "10"));

    let result = service.execute(submission).await.unwrap();
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output.as_deref(), Some("4\n"));
    let tests = result.test_results.unwrap();
    assert_eq!(tests.len(), 2);
    assert!(tests.iter().all(|t| t.passed && t.error.is_none()));
    assert_eq!(remaining_workspaces(root.path()), 0);
}
