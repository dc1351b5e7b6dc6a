//! Error handling for the todo access layer and client state

use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Unified error type for the todo library
#[derive(Error, Debug)]
pub enum Error {
    /// A write operation was attempted without an authenticated identity
    #[error("Not authenticated")]
    Unauthenticated,

    /// The task store failed; the store's own message is surfaced as-is
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A raw timestamp could not be coerced into ISO-8601
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Caller input was rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identity provider failures other than "no session"
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Network or HTTP related errors outside the store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new normalization error
    pub fn normalization<T: fmt::Display>(msg: T) -> Self {
        Error::Normalization(msg.to_string())
    }

    /// Create a new invalid input error
    pub fn invalid_input<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether this error means the caller has no session
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
