//! Client configuration
//!
//! Mirrors the BLEST client options: `url` (required), `maxBatchSize`
//! (default 25), `bufferDelay` in milliseconds (default 10) and `headers`
//! (default empty), plus an HTTP timeout and an optional cap on retained
//! outcomes. Invalid numeric options fall back to their defaults silently;
//! only a missing or malformed URL is an error.

pub mod normalize;
pub mod validation;

pub use validation::Validate;

use crate::utils::error::{BlestError, Result};
use normalize::{header_list, header_map, positive_integer_str, positive_or_default};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default maximum number of requests per batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;
/// Default debounce window in milliseconds
pub const DEFAULT_BUFFER_DELAY_MS: u64 = 10;
/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Batching client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawClientConfig")]
pub struct ClientConfig {
    /// Batch endpoint
    pub url: String,
    /// Maximum requests per dispatched batch
    pub max_batch_size: usize,
    /// Debounce window between the first enqueue and the flush
    #[serde(serialize_with = "serialize_millis")]
    pub buffer_delay: Duration,
    /// HTTP headers sent with every batch
    pub headers: HashMap<String, String>,
    /// HTTP timeout for one batch call
    #[serde(serialize_with = "serialize_secs")]
    pub request_timeout: Duration,
    /// Cap on terminal outcomes kept in the store; `None` keeps everything
    pub max_retained_outcomes: Option<usize>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            buffer_delay: Duration::from_millis(DEFAULT_BUFFER_DELAY_MS),
            headers: HashMap::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retained_outcomes: None,
        }
    }

    /// Set the batch size; zero falls back to the default
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = if max_batch_size == 0 {
            DEFAULT_MAX_BATCH_SIZE
        } else {
            max_batch_size
        };
        self
    }

    /// Set the debounce window; anything under one millisecond falls back to the default
    pub fn with_buffer_delay(mut self, buffer_delay: Duration) -> Self {
        self.buffer_delay = if buffer_delay.as_millis() == 0 {
            Duration::from_millis(DEFAULT_BUFFER_DELAY_MS)
        } else {
            buffer_delay
        };
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the HTTP timeout; zero falls back to the default
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = if timeout.is_zero() {
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        } else {
            timeout
        };
        self
    }

    /// Cap retained terminal outcomes; zero means unbounded
    pub fn with_max_retained_outcomes(mut self, max: usize) -> Self {
        self.max_retained_outcomes = (max > 0).then_some(max);
        self
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;

        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from `BLEST_*` environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("BLEST_URL")
            .ok_or_else(|| BlestError::config("BLEST_URL is not set"))?;

        let positive = |key: &str| lookup(key).as_deref().and_then(positive_integer_str);

        let mut config = Self::new(url);
        if let Some(size) = positive("BLEST_MAX_BATCH_SIZE") {
            config.max_batch_size = size as usize;
        }
        if let Some(delay) = positive("BLEST_BUFFER_DELAY_MS") {
            config.buffer_delay = Duration::from_millis(delay);
        }
        if let Some(timeout) = positive("BLEST_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(max) = positive("BLEST_MAX_RETAINED_OUTCOMES") {
            config.max_retained_outcomes = Some(max as usize);
        }
        if let Some(headers) = lookup("BLEST_HEADERS") {
            config.headers = header_list(&headers);
        }

        config.validate()?;
        Ok(config)
    }
}

/// On-disk shape: every option except `url` is loosely typed
#[derive(Debug, Deserialize)]
struct RawClientConfig {
    url: Option<String>,
    #[serde(default, alias = "maxBatchSize")]
    max_batch_size: Option<Value>,
    #[serde(default, alias = "bufferDelay")]
    buffer_delay: Option<Value>,
    #[serde(default, alias = "httpHeaders")]
    headers: Option<Value>,
    #[serde(default, alias = "requestTimeout")]
    request_timeout: Option<Value>,
    #[serde(default, alias = "maxRetainedOutcomes")]
    max_retained_outcomes: Option<Value>,
}

impl TryFrom<RawClientConfig> for ClientConfig {
    type Error = String;

    fn try_from(raw: RawClientConfig) -> std::result::Result<Self, Self::Error> {
        let url = raw.url.ok_or_else(|| "url is required".to_string())?;

        Ok(Self {
            url,
            max_batch_size: positive_or_default(
                "max_batch_size",
                raw.max_batch_size.as_ref(),
                DEFAULT_MAX_BATCH_SIZE as u64,
            ) as usize,
            buffer_delay: Duration::from_millis(positive_or_default(
                "buffer_delay",
                raw.buffer_delay.as_ref(),
                DEFAULT_BUFFER_DELAY_MS,
            )),
            headers: header_map(raw.headers.as_ref()),
            request_timeout: Duration::from_secs(positive_or_default(
                "request_timeout",
                raw.request_timeout.as_ref(),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            max_retained_outcomes: raw
                .max_retained_outcomes
                .as_ref()
                .and_then(normalize::positive_integer)
                .map(|max| max as usize),
        })
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn serialize_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}
