//! Configuration for the HTTP evaluator

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Evaluator configuration, usually the `[evaluator]` table of the sandbox config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Whether successful runs are sent for evaluation at all
    #[serde(default)]
    pub enabled: bool,
    /// Chat-completions endpoint
    #[serde(default = "EvaluatorConfig::default_endpoint")]
    pub endpoint: String,
    /// Model name sent with every request
    #[serde(default = "EvaluatorConfig::default_model")]
    pub model: String,
    /// Environment variable holding the bearer token
    #[serde(default = "EvaluatorConfig::default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature
    #[serde(default = "EvaluatorConfig::default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in the reply
    #[serde(default = "EvaluatorConfig::default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout
    #[serde(default = "EvaluatorConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Program output beyond this many characters is cut before prompting
    #[serde(default = "EvaluatorConfig::default_max_output_chars")]
    pub max_output_chars: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: Self::default_endpoint(),
            model: Self::default_model(),
            api_key_env: Self::default_api_key_env(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
            timeout: Self::default_timeout(),
            max_output_chars: Self::default_max_output_chars(),
        }
    }
}

impl EvaluatorConfig {
    fn default_endpoint() -> String {
        "https://api.openai.com/v1/chat/completions".to_string()
    }

    fn default_model() -> String {
        "gpt-4o-mini".to_string()
    }

    fn default_api_key_env() -> String {
        "PROCTOR_EVALUATOR_API_KEY".to_string()
    }

    fn default_temperature() -> f32 {
        0.2
    }

    fn default_max_tokens() -> u32 {
        800
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }

    fn default_max_output_chars() -> usize {
        4_000
    }

    /// Check the endpoint and numeric bounds.
    pub fn validate(&self) -> EvalResult<()> {
        let url = url::Url::parse(&self.endpoint).map_err(|e| {
            EvalError::ConfigError(format!("Invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EvalError::ConfigError(format!(
                "Unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(EvalError::ConfigError(format!(
                "Temperature out of range: {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(EvalError::ConfigError("Model name is empty".to_string()));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> EvalResult<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EvalError::MissingApiKey(self.api_key_env.clone()))
    }
}
