use thiserror::Error;

/// Detailed error types for the evaluator
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Evaluator endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid evaluation: {0}")]
    InvalidResponse(String),
}

pub type EvalResult<T> = Result<T, EvalError>;
