//! Strategy outcomes before normalization

use proctor_common::{ExecutionPhase, ExecutionResult, TestResult};

use crate::execution::ExecutionStage;

/// Failure taxonomy for everything except unsupported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Translation exited non-zero
    Compile,
    /// Program exited non-zero or could not be started
    Runtime,
    /// Wall-clock deadline exceeded, process killed
    Timeout,
    /// Framework heuristic rejected the source
    Validation,
    /// Workspace could not be provisioned or written
    Workspace,
    /// Program ran but at least one test case failed
    TestCases,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Compile => "compile_error",
            FailureKind::Runtime => "runtime_error",
            FailureKind::Timeout => "timeout",
            FailureKind::Validation => "validation_error",
            FailureKind::Workspace => "workspace_error",
            FailureKind::TestCases => "test_failure",
        }
    }
}

/// What a strategy hands back to the aggregator
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Succeeded {
        output: String,
        test_results: Option<Vec<TestResult>>,
    },
    Failed {
        kind: FailureKind,
        phase: ExecutionPhase,
        error: String,
        test_results: Option<Vec<TestResult>>,
    },
}

impl StrategyOutcome {
    pub fn succeeded(output: impl Into<String>) -> Self {
        StrategyOutcome::Succeeded {
            output: output.into(),
            test_results: None,
        }
    }

    pub fn failed(kind: FailureKind, phase: ExecutionPhase, error: impl Into<String>) -> Self {
        StrategyOutcome::Failed {
            kind,
            phase,
            error: error.into(),
            test_results: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StrategyOutcome::Succeeded { .. })
    }

    /// Verdict stage this outcome corresponds to.
    pub fn stage(&self) -> ExecutionStage {
        match self {
            StrategyOutcome::Succeeded { .. } => ExecutionStage::Succeeded,
            StrategyOutcome::Failed {
                kind: FailureKind::Timeout,
                ..
            } => ExecutionStage::TimedOut,
            StrategyOutcome::Failed { .. } => ExecutionStage::Failed,
        }
    }

    pub fn into_result(self, execution_time_ms: u64) -> ExecutionResult {
        match self {
            StrategyOutcome::Succeeded {
                output,
                test_results,
            } => ExecutionResult {
                test_results,
                ..ExecutionResult::succeeded(output, execution_time_ms)
            },
            StrategyOutcome::Failed {
                phase,
                error,
                test_results,
                ..
            } => ExecutionResult {
                test_results,
                ..ExecutionResult::failed(phase, error, execution_time_ms)
            },
        }
    }
}
