//! Session provider that verifies a bearer access token locally

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::{Claims, Identity, SessionProvider};
use crate::error::Result;

/// Resolves the identity carried by one request's access token.
///
/// Tokens are HS256-signed by the identity provider with the project JWT
/// secret. A missing, malformed, expired or wrongly signed token resolves to
/// no identity.
#[derive(Clone)]
pub struct TokenSession {
    key: DecodingKey,
    validation: Validation,
    token: Option<String>,
}

impl TokenSession {
    /// Create a provider for tokens signed with `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token: None,
        }
    }

    /// Only accept tokens issued for `audience` (`authenticated` for signed-in users)
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Use `token` as the request's access token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Use the token from an `Authorization: Bearer <token>` header value
    pub fn with_authorization_header(mut self, header: &str) -> Self {
        self.token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        self
    }

    /// Verify the current token and return its claims
    pub fn claims(&self) -> Option<Claims> {
        let token = self.token.as_deref()?;
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(error = %err, "rejected access token");
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for TokenSession {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(self.claims().map(|claims| Identity {
            user_id: claims.sub,
            access_token: self.token.clone(),
        }))
    }
}
