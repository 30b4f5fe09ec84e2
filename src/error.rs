//! Error types for groqchat.

use std::io;
use thiserror::Error;

/// Result type alias for groqchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in groqchat operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local input rejected before any state change or network call.
    #[error("{0}")]
    Validation(String),

    /// The completion exchange failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A send is already in flight for the active session.
    #[error("A message is already being sent, wait for the reply")]
    Busy,

    /// No archived chat with this id.
    #[error("Chat not found: {0}")]
    RecordNotFound(u64),

    /// Storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures of the completion exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No API key is configured.
    #[error("Please enter your API key first")]
    MissingCredential,

    /// The endpoint answered with a non-success status.
    #[error("{0}")]
    Remote(String),

    /// The endpoint answered successfully but the body had no reply in it.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request never got an HTTP answer.
    #[error("Request failed: {0}")]
    Transport(String),
}
