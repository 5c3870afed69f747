//! Configuration validation
//!
//! Only the endpoint URL and the configured HTTP headers can fail
//! validation; every other option is normalized to a default instead.

use super::ClientConfig;
use crate::utils::error::{BlestError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Configuration validation trait
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Check that `url_str` is an absolute http(s) URL with a host
pub fn validate_endpoint_url(url_str: &str) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(BlestError::config("url is required"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| BlestError::config(format!("url has invalid format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(BlestError::config(format!(
                "url must use http:// or https:// scheme, got: {}",
                scheme
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(BlestError::config("url must have a valid host"));
    }

    Ok(url)
}

/// Check that a configured header can be sent as an HTTP header
pub fn validate_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| BlestError::config(format!("Invalid header name '{}': {}", name, e)))?;
    HeaderValue::from_str(value)
        .map_err(|e| BlestError::config(format!("Invalid header value for '{}': {}", name, e)))?;
    Ok(())
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_endpoint_url(&self.url)?;
        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }
        Ok(())
    }
}
