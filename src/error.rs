//! Error handling for the WebCarros client

use std::fmt;
use thiserror::Error;

use crate::listing::validate::ValidationErrors;

/// Unified error type for the WebCarros client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local file access errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Document store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// One or more draft fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The attached file is not a jpeg or png image
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Submission was triggered with no uploaded images
    #[error("A listing needs at least one image")]
    EmptySubmission,

    /// A previous submission of this draft has not finished yet
    #[error("Submission already in flight")]
    SubmissionInFlight,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new document store error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new object storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}
