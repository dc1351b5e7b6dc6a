//! Task store backed by the PostgREST API

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use url::Url;

use super::filter::{order_param, Filter, SortOrder};
use super::{StoreError, TaskStore};
use crate::fetch::{failure_text, Fetch, FetchBuilder};
use crate::model::{CompletionPatch, NewTask, RawTask, TaskId};

/// Client for the task table through `/rest/v1/<table>`
#[derive(Clone)]
pub struct RestTaskStore {
    /// The base URL for the project
    base_url: String,

    /// The anonymous API key for the project
    api_key: String,

    /// The table name
    table: String,

    /// The database schema
    schema: String,

    /// Access token of the request this handle serves
    access_token: Option<String>,

    /// HTTP client
    http_client: Client,
}

impl RestTaskStore {
    /// Create a new RestTaskStore
    pub fn new(base_url: &str, api_key: &str, table: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            schema: "public".to_string(),
            access_token: None,
            http_client,
        }
    }

    /// Target a schema other than `public`
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    /// Base URL for REST requests against the table
    fn table_url(&self) -> Result<Url, StoreError> {
        Ok(Url::parse(&format!(
            "{}/rest/v1/{}",
            self.base_url, self.table
        ))?)
    }

    /// Attach the headers every request carries
    fn prepare<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        let mut fetch = fetch.header("apikey", &self.api_key).bearer_auth(token);
        if self.schema != "public" {
            fetch = fetch
                .header("Accept-Profile", &self.schema)
                .header("Content-Profile", &self.schema);
        }
        fetch
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, body) = failure_text(response).await;
        Err(StoreError::from_response(status, body))
    }

    fn owned_filters<'a>(fetch: FetchBuilder<'a>, id: TaskId, owner_id: &str) -> FetchBuilder<'a> {
        let by_id = Filter::eq("id", id);
        let by_owner = Filter::eq("owner_id", owner_id);
        fetch
            .query(by_id.column, &by_id.param())
            .query(by_owner.column, &by_owner.param())
    }
}

#[async_trait]
impl TaskStore for RestTaskStore {
    async fn insert(&self, task: NewTask) -> Result<(), StoreError> {
        let fetch = self
            .prepare(Fetch::post(&self.http_client, self.table_url()?))
            .header("Prefer", "return=minimal")
            .json(&task)?;

        tracing::debug!(table = %self.table, owner_id = %task.owner_id, "inserting task");
        Self::check(fetch.send().await?).await?;
        Ok(())
    }

    async fn select_owned(&self, owner_id: &str) -> Result<Vec<RawTask>, StoreError> {
        let by_owner = Filter::eq("owner_id", owner_id);
        let fetch = self
            .prepare(Fetch::get(&self.http_client, self.table_url()?))
            .query("select", "*")
            .query(by_owner.column, &by_owner.param())
            .query("order", &order_param("inserted_at", SortOrder::Descending));

        tracing::debug!(table = %self.table, owner_id, "selecting tasks");
        let response = Self::check(fetch.send().await?).await?;
        response
            .json::<Vec<RawTask>>()
            .await
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    async fn update_completion(
        &self,
        id: TaskId,
        owner_id: &str,
        is_complete: bool,
    ) -> Result<(), StoreError> {
        let fetch = self
            .prepare(Fetch::patch(&self.http_client, self.table_url()?))
            .header("Prefer", "return=minimal");
        let fetch = Self::owned_filters(fetch, id, owner_id).json(&CompletionPatch { is_complete })?;

        tracing::debug!(table = %self.table, id, owner_id, is_complete, "updating task");
        Self::check(fetch.send().await?).await?;
        Ok(())
    }

    async fn delete_owned(&self, id: TaskId, owner_id: &str) -> Result<(), StoreError> {
        let fetch = self
            .prepare(Fetch::delete(&self.http_client, self.table_url()?))
            .header("Prefer", "return=minimal");
        let fetch = Self::owned_filters(fetch, id, owner_id);

        tracing::debug!(table = %self.table, id, owner_id, "deleting task");
        Self::check(fetch.send().await?).await?;
        Ok(())
    }

    fn with_access_token(self: Arc<Self>, token: &str) -> Arc<dyn TaskStore> {
        let mut scoped = (*self).clone();
        scoped.access_token = Some(token.to_string());
        Arc::new(scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> RestTaskStore {
        RestTaskStore::new(&server.uri(), "fake-key", "todos", Client::new())
    }

    #[tokio::test]
    async fn test_select_owned() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .and(query_param("select", "*"))
            .and(query_param("owner_id", "eq.u1"))
            .and(query_param("order", "inserted_at.desc"))
            .and(header("apikey", "fake-key"))
            .and(header("Authorization", "Bearer fake-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "task": "second", "is_complete": true, "owner_id": "u1",
                  "inserted_at": "2024-03-02T00:00:00+00:00" },
                { "id": 1, "task": "first", "is_complete": false, "owner_id": "u1",
                  "inserted_at": "2024-03-01T00:00:00+00:00" }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let rows = store(&mock_server).select_owned("u1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].task, "second");
        assert!(rows[0].is_complete);
    }

    #[tokio::test]
    async fn test_insert_sends_owner_and_minimal_return() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/todos"))
            .and(header("Prefer", "return=minimal"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "task": "buy milk", "owner_id": "u1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = store(&mock_server)
            .insert(NewTask {
                task: "buy milk".to_string(),
                owner_id: "u1".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_and_delete_filter_by_id_and_owner() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/todos"))
            .and(query_param("id", "eq.5"))
            .and(query_param("owner_id", "eq.u1"))
            .and(body_json(json!({ "is_complete": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/todos"))
            .and(query_param("id", "eq.5"))
            .and(query_param("owner_id", "eq.u1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store(&mock_server);
        store.update_completion(5, "u1", true).await.unwrap();
        store.delete_owned(5, "u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_access_token_and_schema_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .and(header("Authorization", "Bearer user-jwt"))
            .and(header("Accept-Profile", "app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = Arc::new(store(&mock_server).with_schema("app"));
        let scoped = base.with_access_token("user-jwt");
        assert!(scoped.select_owned("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_handling() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/todos"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "23502",
                "message": "null value in column \"task\" violates not-null constraint",
                "details": null,
                "hint": null
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/todos"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let store = store(&mock_server);
        let insert = store
            .insert(NewTask {
                task: String::new(),
                owner_id: "u1".to_string(),
            })
            .await;
        match insert {
            Err(StoreError::ApiError { details, status }) => {
                assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
                assert_eq!(details.code.as_deref(), Some("23502"));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }

        match store.select_owned("u1").await {
            Err(StoreError::UnparsedApiError { message, status }) => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("Expected UnparsedApiError, got {:?}", other),
        }
    }
}
