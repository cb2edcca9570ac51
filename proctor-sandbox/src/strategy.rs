//! Execution strategies - one per language family

mod compiled;
mod heuristic;
mod interpreted;
mod testcases;

use async_trait::async_trait;
use proctor_common::{ExecutionPhase, Submission};

use crate::execution::{ExecutionStage, ExecutionTrace};
use crate::language::{Language, StrategyKind};
use crate::limits::ExecutionLimits;
use crate::runtime::{ProcessRunner, ProcessSpec, RunError};
use crate::types::{FailureKind, StrategyOutcome};
use crate::workspace::Workspace;

pub use compiled::{CppStrategy, JavaStrategy};
pub use heuristic::{FrameworkHeuristicStrategy, HeuristicReport};
pub use interpreted::InterpretedStrategy;

/// Everything a strategy may touch while running one submission
pub struct StrategyContext<'a> {
    pub submission: &'a Submission,
    pub workspace: &'a Workspace,
    pub runner: &'a ProcessRunner,
    pub limits: &'a ExecutionLimits,
    pub trace: &'a mut ExecutionTrace,
}

impl StrategyContext<'_> {
    pub fn enter(&mut self, stage: ExecutionStage) {
        self.trace.enter(stage);
    }
}

/// Strategy abstraction for turning a submission into an outcome
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn language(&self) -> Language;

    fn kind(&self) -> StrategyKind {
        self.language().strategy_kind()
    }

    /// Run the submission inside `ctx.workspace`.
    ///
    /// Never fails: every problem is folded into a [`StrategyOutcome`].
    async fn execute(&self, ctx: StrategyContext<'_>) -> StrategyOutcome;
}

/// Run a prepared program once, or once per test case when there are any.
///
/// With test cases the program only ever sees case input on stdin, so code
/// that reads its input eagerly is not run against an empty stdin first.
pub(crate) async fn run_program(
    ctx: &mut StrategyContext<'_>,
    template: ProcessSpec,
) -> StrategyOutcome {
    ctx.enter(ExecutionStage::Executing);

    if ctx.submission.test_cases.is_empty() {
        return match ctx.runner.run(template).await {
            Ok(output) => StrategyOutcome::succeeded(output.stdout),
            Err(err) => run_failure(err),
        };
    }

    match testcases::run_cases(ctx.runner, &template, &ctx.submission.test_cases).await {
        Ok(results) => testcases::into_outcome(results),
        Err(err) => run_failure(err),
    }
}

fn run_failure(err: RunError) -> StrategyOutcome {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Runtime
    };
    StrategyOutcome::failed(kind, ExecutionPhase::Run, err.to_string())
}

fn workspace_failure(phase: ExecutionPhase, err: impl std::fmt::Display) -> StrategyOutcome {
    StrategyOutcome::failed(FailureKind::Workspace, phase, err.to_string())
}
