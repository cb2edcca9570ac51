//! Test-case runs for interpreted and compiled programs

use proctor_common::{ExecutionPhase, TestCase, TestResult};

use crate::runtime::{ProcessRunner, ProcessSpec, RunError};
use crate::types::{FailureKind, StrategyOutcome};

/// Run `template` once per case with the case input on stdin.
///
/// Cases run sequentially; each one gets the full execution timeout. A
/// program that cannot be started at all aborts the whole run.
pub(crate) async fn run_cases(
    runner: &ProcessRunner,
    template: &ProcessSpec,
    cases: &[TestCase],
) -> Result<Vec<TestResult>, RunError> {
    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        let spec = template.clone().stdin(case.input.clone());
        let result = match runner.run(spec).await {
            Err(err @ RunError::Spawn { .. }) => return Err(err),
            Ok(output) => TestResult {
                passed: outputs_match(&output.stdout, &case.expected_output),
                input: case.input.clone(),
                expected_output: case.expected_output.clone(),
                actual_output: Some(output.stdout),
                error: None,
                description: case.description.clone(),
            },
            Err(err) => {
                let actual_output = match &err {
                    RunError::Exited { stdout, .. } if !stdout.is_empty() => Some(stdout.clone()),
                    _ => None,
                };
                TestResult {
                    passed: false,
                    input: case.input.clone(),
                    expected_output: case.expected_output.clone(),
                    actual_output,
                    error: Some(err.to_string()),
                    description: case.description.clone(),
                }
            }
        };
        tracing::debug!(passed = result.passed, "Test case finished");
        results.push(result);
    }
    Ok(results)
}

/// Trailing and leading whitespace is not significant.
pub(crate) fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

/// All cases passing is a success whose output is the first case's stdout.
pub(crate) fn into_outcome(results: Vec<TestResult>) -> StrategyOutcome {
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed == 0 {
        let output = results
            .first()
            .and_then(|r| r.actual_output.clone())
            .unwrap_or_default();
        return StrategyOutcome::Succeeded {
            output,
            test_results: Some(results),
        };
    }
    StrategyOutcome::Failed {
        kind: FailureKind::TestCases,
        phase: ExecutionPhase::Run,
        error: format!("{} of {} test cases failed", failed, results.len()),
        test_results: Some(results),
    }
}
