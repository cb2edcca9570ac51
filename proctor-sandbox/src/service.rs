//! Sandbox service - main entry point

use std::sync::Arc;
use std::time::{Duration, Instant};

use proctor_common::{ExecutionPhase, ExecutionResult, Submission, SubmissionId};
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::config::SandboxConfig;
use crate::error::{EvaluationError, Result, SandboxError};
use crate::evaluator::{Evaluator, NullEvaluator};
use crate::execution::{ExecutionStage, ExecutionTrace};
use crate::limits::ExecutionLimits;
use crate::registry::LanguageRegistry;
use crate::runtime::ProcessRunner;
use crate::strategy::{ExecutionStrategy, StrategyContext};
use crate::types::{FailureKind, StrategyOutcome};
use crate::workspace::WorkspaceManager;

/// Upper bound on one evaluator call unless overridden.
pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes submissions and aggregates their results
pub struct SandboxService {
    registry: LanguageRegistry,
    workspaces: WorkspaceManager,
    runner: ProcessRunner,
    limits: ExecutionLimits,
    evaluator: Arc<dyn Evaluator>,
    evaluation_timeout: Duration,
    /// Caps submissions executing at once
    permits: Arc<Semaphore>,
}

impl SandboxService {
    /// Create a service without an evaluator.
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            registry: LanguageRegistry::new(&config.toolchains, &config.heuristics),
            workspaces: WorkspaceManager::new(&config.workspace_root),
            runner: ProcessRunner::new(config.limits.max_output_bytes),
            limits: config.limits.clone(),
            evaluator: Arc::new(NullEvaluator),
            evaluation_timeout: DEFAULT_EVALUATION_TIMEOUT,
            permits: Arc::new(Semaphore::new(config.max_concurrent_executions.max(1))),
        }
    }

    /// Replace the installed evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_evaluation_timeout(mut self, timeout: Duration) -> Self {
        self.evaluation_timeout = timeout;
        self
    }

    /// Replace the language registry.
    pub fn with_registry(mut self, registry: LanguageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Execute one submission.
    ///
    /// Only an unsupported language (or a shut-down service) is an `Err`;
    /// every execution failure is reported inside the returned result.
    pub async fn execute(&self, submission: Submission) -> Result<ExecutionResult> {
        self.execute_traced(submission)
            .await
            .map(|(result, _)| result)
    }

    /// Like [`execute`](Self::execute), also returning the stages passed through.
    pub async fn execute_traced(
        &self,
        submission: Submission,
    ) -> Result<(ExecutionResult, ExecutionTrace)> {
        let started = Instant::now();
        let id = SubmissionId::new();

        // Must fail before any filesystem work.
        let strategy = self.registry.resolve(&submission.language)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SandboxError::ShuttingDown)?;

        let span = tracing::info_span!(
            "submission",
            submission_id = %id,
            language = %strategy.language(),
        );
        let traced = self
            .run_submission(id, strategy, &submission, started)
            .instrument(span)
            .await;
        Ok(traced)
    }

    async fn run_submission(
        &self,
        id: SubmissionId,
        strategy: Arc<dyn ExecutionStrategy>,
        submission: &Submission,
        started: Instant,
    ) -> (ExecutionResult, ExecutionTrace) {
        let mut trace = ExecutionTrace::new(id);
        tracing::info!(
            strategy = %strategy.kind(),
            code_len = submission.code.len(),
            test_cases = submission.test_cases.len(),
            "Executing submission"
        );

        let outcome = match self.workspaces.create(id).await {
            Ok(workspace) => {
                trace.enter(ExecutionStage::WorkspaceCreated);
                let outcome = strategy
                    .execute(StrategyContext {
                        submission,
                        workspace: &workspace,
                        runner: &self.runner,
                        limits: &self.limits,
                        trace: &mut trace,
                    })
                    .await;
                trace.enter(outcome.stage());

                if let Err(e) = workspace.destroy().await {
                    tracing::warn!("Workspace cleanup failed: {}", e);
                }
                trace.enter(ExecutionStage::WorkspaceDestroyed);
                outcome
            }
            Err(e) => {
                tracing::error!("Failed to create workspace: {}", e);
                let outcome =
                    StrategyOutcome::failed(FailureKind::Workspace, ExecutionPhase::Run, e.to_string());
                trace.enter(outcome.stage());
                outcome
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            StrategyOutcome::Succeeded { .. } => {
                tracing::info!(elapsed_ms, "Submission succeeded");
            }
            StrategyOutcome::Failed { kind, phase, .. } => {
                tracing::info!(
                    elapsed_ms,
                    kind = kind.as_str(),
                    phase = %phase,
                    "Submission failed"
                );
            }
        }

        let mut result = outcome.into_result(elapsed_ms);
        if self.should_evaluate(&result) {
            trace.enter(ExecutionStage::EvaluationAttempted);
            result.ai_evaluation = self.evaluate(submission, &result).await;
        }

        trace.enter(ExecutionStage::ResultReturned);
        (result, trace)
    }

    fn should_evaluate(&self, result: &ExecutionResult) -> bool {
        let has_output = result
            .output
            .as_deref()
            .is_some_and(|output| !output.trim().is_empty());
        result.success && has_output && self.evaluator.is_enabled()
    }

    /// Evaluation failures are logged and never affect the verdict.
    async fn evaluate(
        &self,
        submission: &Submission,
        result: &ExecutionResult,
    ) -> Option<proctor_common::EvaluationResult> {
        let output = result.output.as_deref().unwrap_or_default();
        let evaluation = tokio::time::timeout(
            self.evaluation_timeout,
            self.evaluator
                .evaluate(&submission.code, &submission.language, output),
        )
        .await
        .unwrap_or_else(|_| {
            Err(EvaluationError::Timeout(
                self.evaluation_timeout.as_millis() as u64,
            ))
        });

        match evaluation {
            Ok(evaluation) => {
                tracing::debug!(score = evaluation.score, "Evaluation attached");
                Some(evaluation)
            }
            Err(e) => {
                tracing::warn!("Evaluation failed: {}", e);
                None
            }
        }
    }

    /// Stop accepting submissions. In-flight submissions run to completion.
    pub fn shutdown(&self) {
        self.permits.close();
        tracing::info!("Sandbox shutting down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }
}
