//! Sandbox integration
//!
//! [`HttpEvaluator`] implements the sandbox's [`Evaluator`] seam, and
//! [`sandbox_evaluator`] picks the evaluator a service should be built with.

use std::sync::Arc;

use async_trait::async_trait;
use proctor_common::EvaluationResult;
use proctor_sandbox::{EvaluationError, Evaluator, NullEvaluator};

use crate::config::EvaluatorConfig;
use crate::service::{EvaluationRequest, HttpEvaluator};

#[async_trait]
impl Evaluator for HttpEvaluator {
    async fn evaluate(
        &self,
        code: &str,
        language: &str,
        output: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        let request = EvaluationRequest {
            code,
            language,
            output,
        };
        HttpEvaluator::evaluate(self, request)
            .await
            .map_err(EvaluationError::backend)
    }

    fn is_enabled(&self) -> bool {
        self.config().enabled
    }
}

/// The HTTP evaluator when it is enabled and can be built, else a [`NullEvaluator`].
///
/// A broken evaluator setup (missing key, bad endpoint) is logged and the
/// sandbox runs without scoring.
pub fn sandbox_evaluator(config: &EvaluatorConfig) -> Arc<dyn Evaluator> {
    if !config.enabled {
        return Arc::new(NullEvaluator);
    }
    match HttpEvaluator::new(config.clone()) {
        Ok(client) => {
            tracing::info!(endpoint = %config.endpoint, model = %config.model, "Evaluator enabled");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("Evaluator unavailable, continuing without it: {}", e);
            Arc::new(NullEvaluator)
        }
    }
}
