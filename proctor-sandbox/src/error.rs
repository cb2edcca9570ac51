use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the sandbox facade.
///
/// Execution failures (compile, runtime, timeout, workspace) never surface
/// here; they are folded into the returned `ExecutionResult`.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Raised before any workspace is created.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Raised only after [`crate::SandboxService::shutdown`].
    #[error("Sandbox is shutting down")]
    ShuttingDown,
}

/// Filesystem failures while provisioning or tearing down a workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Failed to create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove workspace {path}: {source}")]
    Destroy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Evaluator failures. Logged and swallowed by the aggregator.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Failure reported by the evaluator backend itself
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[error("Evaluator timed out after {0} ms")]
    Timeout(u64),

    #[error("Evaluator failed: {0}")]
    Other(String),
}

impl EvaluationError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        EvaluationError::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
