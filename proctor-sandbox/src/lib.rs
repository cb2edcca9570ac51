//! Proctor sandbox - time-bounded execution of interview submissions
//!
//! Resolves a submission's language to a strategy, runs it inside a
//! throwaway workspace under a wall-clock deadline, and folds every outcome
//! into a single `ExecutionResult`. Successful runs can optionally be scored
//! by an external evaluator.

mod config;
mod error;
mod evaluator;
mod execution;
mod language;
mod limits;
mod registry;
mod runtime;
mod service;
mod strategy;
mod types;
mod workspace;

pub use config::{
    CommandSpec, HeuristicConfig, SandboxConfig, ToolchainConfig, CONFIG_ENV,
    MAX_CONCURRENCY_ENV, WORKSPACE_ROOT_ENV,
};
pub use error::{EvaluationError, Result, SandboxError, WorkspaceError};
pub use evaluator::{Evaluator, NullEvaluator};
pub use execution::{ExecutionStage, ExecutionTrace};
pub use language::{Language, StrategyKind};
pub use limits::ExecutionLimits;
pub use registry::LanguageRegistry;
pub use runtime::{ProcessOutput, ProcessRunner, ProcessSpec, RunError};
pub use service::SandboxService;
pub use strategy::{
    CppStrategy, ExecutionStrategy, FrameworkHeuristicStrategy, HeuristicReport,
    InterpretedStrategy, JavaStrategy, StrategyContext,
};
pub use types::{FailureKind, StrategyOutcome};
pub use workspace::{Workspace, WorkspaceManager};

pub use proctor_common::{
    CodeQuality, EvaluationResult, ExecutionPhase, ExecutionResult, Submission, SubmissionId,
    TestCase, TestResult,
};
