#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Text generation for the surveillance chat endpoint.
//!
//! Supports Anthropic Claude, `OpenAI`, Google Gemini, and any
//! `OpenAI`-compatible local/self-hosted server (Ollama, vLLM, llama.cpp,
//! LM Studio) via the `AI_BASE_URL` environment variable.
//!
//! The model never sees raw records. [`chat::answer_question`] summarizes
//! the matching data first and asks the model to phrase an answer from that
//! summary alone, falling back to the summary headline whenever generation
//! is unavailable.

pub mod chat;
pub mod providers;

use thiserror::Error;

pub use chat::answer_question;
pub use providers::{TextGenerator, create_generator_from_env};

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
