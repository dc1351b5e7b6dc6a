//! HTTP request helper shared by the REST store and the auth client

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, Response, StatusCode,
};
use serde::Serialize;
use url::Url;

pub(crate) const CLIENT_INFO: &str = concat!("neon-todos/", env!("CARGO_PKG_VERSION"));

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: Url, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("X-Client-Info", HeaderValue::from_static(CLIENT_INFO));

        Self {
            client,
            url,
            method,
            headers,
            body: None,
        }
    }

    /// Add a header to the request; invalid names or values are skipped
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Append a query parameter; repeated keys are kept in order
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// The request URL with query parameters applied
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the request and return the raw response, whatever its status
    pub async fn send(self) -> Result<Response, reqwest::Error> {
        let mut req = self
            .client
            .request(self.method, self.url)
            .headers(self.headers);
        if let Some(body) = self.body {
            req = req.body(body);
        }
        req.send().await
    }
}

/// Status and body text of a non-success response
pub(crate) async fn failure_text(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    (status, text)
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: Url) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: Url) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PATCH request
    pub fn patch<'a>(client: &'a Client, url: Url) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PATCH)
    }

    /// Create a DELETE request
    pub fn delete<'a>(client: &'a Client, url: Url) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}
