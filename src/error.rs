//! Crate-wide error type.
//!
//! Route handlers turn a `HookyError` into the JSON error envelope, using
//! [`HookyError::status`] as the HTTP-like status code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookyError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The backing key-value storage rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An upstream stage (transcription, generation, OCR) produced unusable output.
    #[error("{0}")]
    Pipeline(String),

    #[error("cannot {event} while on {screen}")]
    InvalidTransition { screen: String, event: String },
}

impl HookyError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline(message.into())
    }

    /// HTTP-like status code reported in the response envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::InvalidTransition { .. } => 409,
            Self::Pipeline(_) => 502,
            Self::Storage(_) | Self::Serialization(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookyError>;
