//! Types returned by the hosted identity provider

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID; this is the owner id stored on every task
    pub id: String,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// The user's phone number
    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub app_metadata: serde_json::Value,

    #[serde(default)]
    pub user_metadata: serde_json::Value,

    /// The user's role
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp in seconds since the epoch
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in user
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Create a new session expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: String, expires_in: i64, user: User) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in,
            expires_at: Some(Utc::now().timestamp() + expires_in),
            user,
        }
    }

    /// Check if the session has expired. Sessions without an expiry
    /// timestamp never expire locally.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }
}

/// Result of a sign-up. With email confirmation enabled the provider
/// answers with the new user only; otherwise the user is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(User),
}

impl SignUpResponse {
    /// The session, when sign-up also signed the user in
    pub fn session(&self) -> Option<&Session> {
        match self {
            SignUpResponse::Session(session) => Some(session),
            SignUpResponse::User(_) => None,
        }
    }

    pub fn user(&self) -> &User {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::User(user) => user,
        }
    }
}

/// Claims read from an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID
    pub sub: String,

    /// Expiry in seconds since the epoch
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: None,
            phone: None,
            app_metadata: json!({}),
            user_metadata: json!({}),
            role: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn session_expiry() {
        let session = Session::new("a".to_string(), "r".to_string(), 3600, user());
        assert!(!session.is_expired());

        let mut expired = session.clone();
        expired.expires_at = Some(Utc::now().timestamp() - 1);
        assert!(expired.is_expired());

        expired.expires_at = None;
        assert!(!expired.is_expired());
    }

    #[test]
    fn session_parses_token_response() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000i64,
            "refresh_token": "refresh",
            "user": {
                "id": "5f0c1b0e-0000-4000-8000-000000000001",
                "aud": "authenticated",
                "email": "ada@example.com",
                "app_metadata": { "provider": "email" },
                "user_metadata": {},
                "created_at": "2024-03-01T10:00:00Z"
            }
        }))
        .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.expires_at, Some(1_900_000_000));
    }

    #[test]
    fn sign_up_response_with_or_without_session() {
        let pending: SignUpResponse = serde_json::from_value(json!({
            "id": "u2",
            "email": "grace@example.com",
            "confirmation_sent_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert!(pending.session().is_none());
        assert_eq!(pending.user().id, "u2");

        let signed_in: SignUpResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": "u3" }
        }))
        .unwrap();
        assert_eq!(signed_in.session().map(|s| s.access_token.as_str()), Some("jwt"));
        assert_eq!(signed_in.user().id, "u3");
    }
}
