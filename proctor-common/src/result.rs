use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationResult;

/// Stage of the pipeline that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPhase {
    /// Translation step of a compiled language.
    Compile,
    /// Running the program (or its test cases).
    Run,
    /// Static validation of a framework pseudo-language.
    Validate,
}

impl std::fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExecutionPhase::Compile => "compile",
            ExecutionPhase::Run => "run",
            ExecutionPhase::Validate => "validate",
        })
    }
}

/// Normalized outcome returned to the calling service for every submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration of the whole execution in milliseconds.
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ExecutionPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_evaluation: Option<EvaluationResult>,
}

impl ExecutionResult {
    pub fn succeeded(output: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            execution_time_ms,
            phase: None,
            test_results: None,
            ai_evaluation: None,
        }
    }

    pub fn failed(phase: ExecutionPhase, error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            execution_time_ms,
            phase: Some(phase),
            test_results: None,
            ai_evaluation: None,
        }
    }

    /// Number of failed test cases, if any were run.
    pub fn failed_test_count(&self) -> usize {
        self.test_results
            .as_ref()
            .map(|results| results.iter().filter(|r| !r.passed).count())
            .unwrap_or(0)
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
