//! Error types for Topicmem

use crate::store::{DeletePreview, TopicSummary};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or malformed input (empty content, bad limit, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Topic or entry absent
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Topic name already taken; carries the existing topic
    #[error("Topic already exists: {}", .0.name)]
    AlreadyExists(Box<TopicSummary>),

    /// Topic deletion requested without `confirm = true`
    #[error("Confirmation required to delete topic: {}", .0.name)]
    ConfirmationRequired(Box<DeletePreview>),

    /// Unrecognized action value
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Transport error (stdio loop)
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
