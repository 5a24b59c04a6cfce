//! HTTP transport used to reach the chat completion endpoint.
//!
//! The gateway only needs "POST this JSON, give me status and body", so that is
//! all [`HttpTransport`] exposes. [`ReqwestTransport`] is the real client.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` with bearer authorization
    async fn post_json(&self, url: &str, bearer_token: &str, body: &Value) -> Result<HttpResponse>;
}

/// Transport backed by a reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, bearer_token: &str, body: &Value) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status = status, bytes = body.len(), "Received response");

        Ok(HttpResponse { status, body })
    }
}
