//! Failures raised by task stores

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error body PostgREST returns on a failed request
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: ApiErrorDetails,
        status: reqwest::StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Build an error from a failed response body, keeping PostgREST details
    /// when the body carries a code or a message. Any other body is kept
    /// verbatim.
    pub fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        match serde_json::from_str::<ApiErrorDetails>(&body) {
            Ok(details) if details.code.is_some() || details.message.is_some() => {
                StoreError::ApiError { details, status }
            }
            _ => StoreError::UnparsedApiError {
                message: body,
                status,
            },
        }
    }

    /// HTTP status of the failed request, if the store answered at all
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            StoreError::ApiError { status, .. } | StoreError::UnparsedApiError { status, .. } => {
                Some(*status)
            }
            StoreError::Network(e) => e.status(),
            _ => None,
        }
    }
}
