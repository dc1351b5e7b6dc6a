//! Personal task list over Supabase
//!
//! Signed-in users create, list, toggle and delete short text tasks stored in
//! a `todos` table. Every store statement is scoped by the owner id, and the
//! client-side [`TodoList`](state::TodoList) refetches the whole list after
//! each write so it always mirrors what the server holds.

pub mod access;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod session;
pub mod state;
pub mod store;
pub mod view;

use std::sync::Arc;

use reqwest::Client;

use crate::access::ServerActions;
use crate::config::TodoConfig;
use crate::error::Result;
use crate::session::{AuthClient, SessionProvider, TokenSession};
use crate::state::TodoList;
use crate::store::RestTaskStore;

/// The main entry point: one project, one shared HTTP client
pub struct TodoClient {
    /// Connection settings
    pub config: TodoConfig,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for sign-in and session management
    pub auth: Arc<AuthClient>,
    /// Task table handle, authorized with the anon key
    pub store: Arc<RestTaskStore>,
}

impl TodoClient {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use neon_todos::{config::TodoConfig, TodoClient};
    ///
    /// # async fn run() -> neon_todos::error::Result<()> {
    /// let config = TodoConfig::new("https://your-project.supabase.co", "your-anon-key".to_string())?;
    /// let client = TodoClient::new(config)?;
    /// client.auth().sign_in_with_password("ada@example.com", "secret").await?;
    ///
    /// let todos = client.todo_list();
    /// todos.add("buy milk").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: TodoConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let base_url = config.base_url();
        let auth = AuthClient::new(
            &base_url,
            &config.anon_key,
            http_client.clone(),
            config.options.persist_session,
        );
        let store = RestTaskStore::new(
            &base_url,
            &config.anon_key,
            &config.options.table,
            http_client.clone(),
        )
        .with_schema(&config.options.db_schema);

        Ok(Self {
            config,
            http_client,
            auth: Arc::new(auth),
            store: Arc::new(store),
        })
    }

    /// Create a client from `SUPABASE_*` / `TODOS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TodoConfig::from_env()?)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The task table, without a user token
    pub fn store(&self) -> Arc<RestTaskStore> {
        self.store.clone()
    }

    /// Access layer calls on behalf of whoever is signed in to [`Self::auth`]
    pub fn actions(&self) -> ServerActions {
        ServerActions::new(self.auth.clone(), self.store.clone())
    }

    /// Access layer calls on behalf of whoever `sessions` resolves to
    pub fn actions_for(&self, sessions: Arc<dyn SessionProvider>) -> ServerActions {
        ServerActions::new(sessions, self.store.clone())
    }

    /// Verifier for bearer tokens forwarded by browsers, when a JWT secret
    /// is configured
    pub fn token_session(&self) -> Option<TokenSession> {
        self.config
            .jwt_secret
            .as_deref()
            .map(|secret| TokenSession::new(secret).with_audience("authenticated"))
    }

    /// A fresh client state container wired to [`Self::actions`]
    pub fn todo_list(&self) -> TodoList {
        TodoList::new(Arc::new(self.actions()), &self.config.options)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::access::{RequestContext, ServerActions, TodoApi};
    pub use crate::config::{ClientOptions, SyncMode, TodoConfig};
    pub use crate::error::{Error, Result};
    pub use crate::model::{RawTask, TaskId, TaskView};
    pub use crate::session::{Identity, SessionProvider, StaticSession, TokenSession};
    pub use crate::state::{Status, TodoList, TodosState};
    pub use crate::store::{MemoryTaskStore, RestTaskStore, TaskStore};
    pub use crate::TodoClient;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::TodoApi;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn signed_in_client_lists_with_the_user_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "user-jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "r",
                "user": { "id": "u1" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .and(query_param("owner_id", "eq.u1"))
            .and(header("Authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "task": "buy milk", "is_complete": false, "owner_id": "u1",
                  "inserted_at": "2024-03-01T10:00:00+00:00" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = TodoClient::new(TodoConfig::new(&server.uri(), "anon".to_string()).unwrap())
            .unwrap();
        client.auth().sign_in_with_password("a", "b").await.unwrap();

        let items = client.todo_list().fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].inserted_at, "2024-03-01T10:00:00+00:00");
    }

    #[tokio::test]
    async fn anonymous_client_lists_nothing_without_touching_the_table() {
        let server = MockServer::start().await;
        let client = TodoClient::new(TodoConfig::new(&server.uri(), "anon".to_string()).unwrap())
            .unwrap();

        assert!(client.actions().list_tasks().await.unwrap().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(client.token_session().is_none());
    }
}
