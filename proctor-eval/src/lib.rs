//! # Proctor evaluator
//!
//! Scores the output of a successful sandbox run by asking an
//! OpenAI-compatible chat-completions endpoint for a structured review:
//! - prompt construction from `(code, language, output)`
//! - tolerant JSON extraction from the model reply
//! - range validation of the returned score sheet
//!
//! The sandbox treats everything in this crate as optional enrichment: it
//! only sees the `Evaluator` implementation from [`sandbox`].

pub mod config;
pub mod error;
pub mod prompt;
pub mod sandbox;
pub mod service;

pub use config::EvaluatorConfig;
pub use error::{EvalError, EvalResult};
pub use prompt::{build_messages, parse_evaluation, ChatMessage};
pub use sandbox::sandbox_evaluator;
pub use service::{EvaluationRequest, HttpEvaluator};
