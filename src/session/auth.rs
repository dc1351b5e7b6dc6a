//! Client for the hosted identity provider (GoTrue, `/auth/v1`)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use tokio::sync::RwLock;
use url::Url;

use super::{Identity, Session, SessionProvider, SignUpResponse, User};
use crate::error::{Error, Result};
use crate::fetch::{failure_text, Fetch, FetchBuilder};

/// Client for Supabase Authentication
#[derive(Clone)]
pub struct AuthClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    http_client: Client,

    /// Whether sign-in keeps the session
    persist_session: bool,

    /// The current session
    current_session: Arc<RwLock<Option<Session>>>,
}

impl AuthClient {
    /// Create a new AuthClient
    pub fn new(url: &str, key: &str, http_client: Client, persist_session: bool) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            persist_session,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    fn auth_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/auth/v1/{}", self.url, path))?)
    }

    fn prepare<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch.header("apikey", &self.key)
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, body) = failure_text(response).await;
        Err(Error::auth(format!("{}: {}", status, body)))
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<Session> {
        let fetch = self
            .prepare(Fetch::post(&self.http_client, self.auth_url("token")?))
            .query("grant_type", grant_type)
            .json(&body)?;

        let response = Self::check(fetch.send().await?).await?;
        let session: Session = response.json().await?;
        self.store_session(&session).await;
        Ok(session)
    }

    async fn store_session(&self, session: &Session) {
        if self.persist_session {
            *self.current_session.write().await = Some(session.clone());
            tracing::info!(user_id = %session.user.id, "session stored");
        }
    }

    /// Sign up a new user with email and password. The user is only signed
    /// in when the project does not require email confirmation.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse> {
        let fetch = self
            .prepare(Fetch::post(&self.http_client, self.auth_url("signup")?))
            .json(&json!({ "email": email, "password": password }))?;

        let response = Self::check(fetch.send().await?).await?;
        let signed_up: SignUpResponse = response.json().await?;
        if let Some(session) = signed_up.session() {
            self.store_session(session).await;
        }
        Ok(signed_up)
    }

    /// Sign in a user with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    /// Exchange the current refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let session = self
            .get_session()
            .await
            .ok_or_else(|| Error::auth("Not logged in"))?;

        self.token_grant(
            "refresh_token",
            json!({ "refresh_token": session.refresh_token }),
        )
        .await
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<()> {
        let session = self
            .get_session()
            .await
            .ok_or_else(|| Error::auth("Not logged in"))?;

        let fetch = self
            .prepare(Fetch::post(&self.http_client, self.auth_url("logout")?))
            .bearer_auth(&session.access_token);
        Self::check(fetch.send().await?).await?;

        *self.current_session.write().await = None;
        tracing::info!(user_id = %session.user.id, "signed out");
        Ok(())
    }

    /// `GET /user` for an access token; transport failures are auth errors
    async fn user_response(&self, access_token: &str) -> Result<Response> {
        let fetch = self
            .prepare(Fetch::get(&self.http_client, self.auth_url("user")?))
            .bearer_auth(access_token);
        fetch.send().await.map_err(Error::auth)
    }

    /// Get the user behind the current session
    pub async fn get_user(&self) -> Result<User> {
        let session = self
            .get_session()
            .await
            .ok_or_else(|| Error::auth("Not logged in"))?;

        let response = Self::check(self.user_response(&session.access_token).await?).await?;
        response.json().await.map_err(Error::auth)
    }

    /// Get the current session
    pub async fn get_session(&self) -> Option<Session> {
        self.current_session.read().await.clone()
    }

    /// Set the session
    pub async fn set_session(&self, session: Session) {
        tracing::info!(user_id = %session.user.id, "session set");
        *self.current_session.write().await = Some(session);
    }

    /// Forget the current session without contacting the server
    pub async fn clear_session(&self) {
        *self.current_session.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for AuthClient {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        let Some(mut session) = self.get_session().await else {
            return Ok(None);
        };

        if session.is_expired() {
            session = match self.refresh_session().await {
                Ok(session) => session,
                Err(Error::Auth(message)) => {
                    tracing::info!(%message, "session refresh rejected");
                    self.clear_session().await;
                    return Ok(None);
                }
                Err(err) => return Err(err),
            };
        }

        let response = self.user_response(&session.access_token).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: User = response.json().await.map_err(Error::auth)?;
                Ok(Some(Identity {
                    user_id: user.id,
                    access_token: Some(session.access_token),
                }))
            }
            _ => {
                let (status, body) = failure_text(response).await;
                Err(Error::auth(format!("{}: {}", status, body)))
            }
        }
    }
}
