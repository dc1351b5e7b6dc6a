//! The access layer and client state over the PostgREST store, with the
//! caller identified by a verified bearer token.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neon_todos::access::{ServerActions, TodoApi};
use neon_todos::config::ClientOptions;
use neon_todos::error::Error;
use neon_todos::session::{Claims, TokenSession};
use neon_todos::state::{Status, TodoList};
use neon_todos::store::{RestTaskStore, StoreError};

const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

fn user_token(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: Utc::now().timestamp() + 3600,
        aud: Some("authenticated".to_string()),
        role: Some("authenticated".to_string()),
        email: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn actions(server: &MockServer, bearer: Option<&str>) -> ServerActions {
    let mut sessions = TokenSession::new(SECRET).with_audience("authenticated");
    if let Some(token) = bearer {
        sessions = sessions.with_token(token);
    }
    let store = RestTaskStore::new(&server.uri(), "anon-key", "todos", Client::new());
    ServerActions::new(Arc::new(sessions), Arc::new(store))
}

#[tokio::test]
async fn writes_are_sent_with_the_callers_token_and_owner_filter() {
    let server = MockServer::start().await;
    let token = user_token("u1");
    let bearer = format!("Bearer {}", token);

    Mock::given(method("POST"))
        .and(path("/rest/v1/todos"))
        .and(header("Authorization", bearer.as_str()))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({ "task": "buy milk", "owner_id": "u1" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .and(query_param("owner_id", "eq.u1"))
        .and(query_param("order", "inserted_at.desc"))
        .and(header("Authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 11, "task": "buy milk", "is_complete": false, "owner_id": "u1",
              "inserted_at": "2024-03-01T10:00:00.000Z" }
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/todos"))
        .and(query_param("id", "eq.11"))
        .and(query_param("owner_id", "eq.u1"))
        .and(body_json(json!({ "is_complete": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let todos = TodoList::new(
        Arc::new(actions(&server, Some(&token))),
        &ClientOptions::default(),
    );
    let items = todos.add("buy milk").await.unwrap();
    assert_eq!(items[0].id, 11);
    assert_eq!(items[0].inserted_at, "2024-03-01T10:00:00.000Z");

    todos.toggle(11, true).await.unwrap();
    assert_eq!(todos.snapshot().update_status, Status::Succeeded);
}

#[tokio::test]
async fn missing_or_foreign_tokens_never_reach_the_table() {
    let server = MockServer::start().await;

    let nobody = actions(&server, None);
    assert!(nobody.list_tasks().await.unwrap().is_empty());
    assert!(nobody.add_task("x").await.unwrap_err().is_unauthenticated());

    let forged = actions(&server, Some("eyJhbGciOiJIUzI1NiJ9.e30.invalid"));
    assert!(forged.delete_task(1).await.unwrap_err().is_unauthenticated());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_errors_surface_in_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "connection to database lost",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let todos = TodoList::new(
        Arc::new(actions(&server, Some(&user_token("u1")))),
        &ClientOptions::default(),
    );
    let err = todos.fetch().await.unwrap_err();
    match &err {
        Error::Store(StoreError::ApiError { details, .. }) => {
            assert_eq!(details.code.as_deref(), Some("XX000"));
        }
        other => panic!("Expected a store API error, got {:?}", other),
    }

    let state = todos.snapshot();
    assert_eq!(state.fetch_status, Status::Failed);
    assert_eq!(state.error, Some(err.to_string()));
    assert!(state.error.unwrap().contains("connection to database lost"));
}
