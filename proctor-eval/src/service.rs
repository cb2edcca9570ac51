//! HTTP client facade for the evaluation endpoint.

use std::time::Instant;

use proctor_common::EvaluationResult;
use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;
use crate::error::{EvalError, EvalResult};
use crate::prompt::{build_messages, parse_evaluation, ChatMessage};

/// Borrowed view of what gets evaluated.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub output: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Evaluator backed by an OpenAI-compatible chat-completions endpoint.
pub struct HttpEvaluator {
    client: reqwest::Client,
    config: EvaluatorConfig,
    api_key: String,
}

impl HttpEvaluator {
    /// Build an evaluator, reading the API key from the configured env var.
    pub fn new(config: EvaluatorConfig) -> EvalResult<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build an evaluator with an explicit API key.
    pub fn with_api_key(config: EvaluatorConfig, api_key: impl Into<String>) -> EvalResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Score one successful run.
    pub async fn evaluate(&self, request: EvaluationRequest<'_>) -> EvalResult<EvaluationResult> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(
                request.code,
                request.language,
                request.output,
                self.config.max_output_chars,
            ),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EvalError::InvalidResponse("response has no choices".to_string()))?;

        let evaluation = parse_evaluation(&reply)?;
        tracing::debug!(
            language = request.language,
            score = evaluation.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Evaluation completed"
        );
        Ok(evaluation)
    }
}
