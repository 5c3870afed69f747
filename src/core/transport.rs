//! Transport seam: how one batch reaches the server

use super::batch::{BatchRequest, BatchResultItem};
use crate::utils::error::{BlestError, Result};
use crate::utils::net::http::create_client;
use crate::utils::truncate_string;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// Sends one batch and returns the decoded per-request results.
///
/// Any `Err` is treated as a batch-level failure for every id in the batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &BatchRequest) -> Result<Vec<BatchResultItem>>;
}

/// Default transport: JSON POST over reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(timeout)?,
        })
    }

    /// Use an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn header_map(request: &BatchRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                BlestError::config(format!("Invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                BlestError::config(format!("Invalid header value for '{}': {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &BatchRequest) -> Result<Vec<BatchResultItem>> {
        let headers = Self::header_map(request)?;
        let body = request.body()?;

        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlestError::status(
                status.as_u16(),
                truncate_string(&body, MAX_ERROR_BODY),
            ));
        }

        let bytes = response.bytes().await?;
        debug!(
            status = status.as_u16(),
            bytes = bytes.len(),
            "Received batch response"
        );
        Ok(serde_json::from_slice(&bytes)?)
    }
}
