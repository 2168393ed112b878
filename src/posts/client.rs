use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::{Record, records_from_json, send_http_request};
use crate::FieldMap;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const POSTS_PATH: &str = "/posts";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// The remote posts resource.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// Fetches every record.
    async fn list(&self) -> Result<Vec<Record>, ApiError>;

    /// Creates a record from `values`. The response body is not used.
    async fn create(&self, values: &FieldMap) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpPostsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostsClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn posts_url(&self) -> String {
        format!("{}{}", self.base_url, POSTS_PATH)
    }

    async fn fetch_list(&self, url: &str) -> Result<Vec<Record>, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "List response");
        if !status.is_success() {
            let body = response.text().await?;
            return Err(server_error(status, &body));
        }
        let body: Value = response.json().await?;
        records_from_json(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn post_values(&self, url: &str, values: &FieldMap) -> Result<(), ApiError> {
        let response = self.client.post(url).json(values).send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Create response");
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(server_error(status, &body))
    }
}

#[async_trait]
impl PostsApi for HttpPostsClient {
    async fn list(&self) -> Result<Vec<Record>, ApiError> {
        let url = self.posts_url();
        let span = tracing::debug_span!("ListPosts", url = %url);
        send_http_request(span, || self.fetch_list(&url)).await
    }

    async fn create(&self, values: &FieldMap) -> Result<(), ApiError> {
        let url = self.posts_url();
        let span = tracing::debug_span!("CreatePost", url = %url, fields = values.len());
        send_http_request(span, || self.post_values(&url, values)).await
    }
}

/// Builds the error for a non-success response, preferring the body's
/// `message` field over the status line.
fn server_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("message")? {
            Value::String(message) => Some(message.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });
    ApiError::Server(message.unwrap_or_else(|| status.to_string()))
}
