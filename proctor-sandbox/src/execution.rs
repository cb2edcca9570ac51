//! Per-submission lifecycle tracking

use proctor_common::SubmissionId;
use serde::{Deserialize, Serialize};

/// Lifecycle stages a submission passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStage {
    Received,
    WorkspaceCreated,
    CompilePhase,
    Executing,
    Succeeded,
    Failed,
    TimedOut,
    WorkspaceDestroyed,
    EvaluationAttempted,
    ResultReturned,
}

impl ExecutionStage {
    /// Execution verdicts after which the workspace must be torn down
    pub fn is_verdict(self) -> bool {
        matches!(
            self,
            ExecutionStage::Succeeded | ExecutionStage::Failed | ExecutionStage::TimedOut
        )
    }
}

/// Ordered record of the stages one submission went through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub submission_id: SubmissionId,
    stages: Vec<ExecutionStage>,
}

impl ExecutionTrace {
    pub fn new(submission_id: SubmissionId) -> Self {
        Self {
            submission_id,
            stages: vec![ExecutionStage::Received],
        }
    }

    /// Append a stage and log the transition.
    pub fn enter(&mut self, stage: ExecutionStage) {
        let from = self.current();
        tracing::trace!(
            submission_id = %self.submission_id,
            from = ?from,
            to = ?stage,
            "Stage transition"
        );
        self.stages.push(stage);
    }

    pub fn current(&self) -> ExecutionStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(ExecutionStage::Received)
    }

    pub fn stages(&self) -> &[ExecutionStage] {
        &self.stages
    }

    pub fn contains(&self, stage: ExecutionStage) -> bool {
        self.stages.contains(&stage)
    }

    /// The verdict stage, if one was reached.
    pub fn verdict(&self) -> Option<ExecutionStage> {
        self.stages.iter().copied().find(|stage| stage.is_verdict())
    }
}
