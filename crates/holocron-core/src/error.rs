//! Error types for the Holocron.

use thiserror::Error;

/// Errors raised by the Holocron crates.
#[derive(Debug, Error)]
pub enum HolocronError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("API key missing for provider: {0}")]
    ApiKeyMissing(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HolocronError>;
