//! Session context: "who is calling", resolved per request.
//!
//! A provider returns the caller's identity, or `None` when nobody is signed
//! in. The "no session" case is never an error.

mod auth;
mod token;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use auth::AuthClient;
pub use token::TokenSession;
pub use types::*;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable opaque user id; stored as `owner_id` on tasks
    pub user_id: String,

    /// Access token to forward to the store, when the session has one
    pub access_token: Option<String>,
}

impl Identity {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }
}

/// Supplies the current identity to every access layer call
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Option<Identity>>;
}

#[async_trait]
impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        (**self).current_identity().await
    }
}

/// A fixed identity, or nobody
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    identity: Option<Identity>,
}

impl StaticSession {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(self.identity.clone())
    }
}
