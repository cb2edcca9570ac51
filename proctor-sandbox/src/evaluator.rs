//! Evaluation seam
//!
//! Backends live outside this crate and are injected into
//! [`SandboxService`](crate::SandboxService).

use async_trait::async_trait;
use proctor_common::EvaluationResult;

use crate::error::EvaluationError;

/// Trait implemented by evaluation backends.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Score a successful run.
    async fn evaluate(
        &self,
        code: &str,
        language: &str,
        output: &str,
    ) -> Result<EvaluationResult, EvaluationError>;

    /// `false` means the aggregator should not call `evaluate` at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Placeholder installed when no evaluator is configured.
#[derive(Debug, Default)]
pub struct NullEvaluator;

#[async_trait]
impl Evaluator for NullEvaluator {
    async fn evaluate(
        &self,
        _code: &str,
        _language: &str,
        _output: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        Err(EvaluationError::Other("no evaluator installed".to_string()))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
