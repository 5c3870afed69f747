//! HTTP client construction
//!
//! Each client owns its own connection pool; the default transport keeps one
//! client for its lifetime so consecutive batches reuse connections.

use crate::utils::error::Result;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Connection pool settings for batch clients
#[derive(Debug, Clone)]
pub struct HttpClientPoolConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// TCP keepalive interval
    pub tcp_keepalive: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 16,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(60),
            user_agent: format!("blest-batch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a client with default pool settings and the given request timeout
pub fn create_client(timeout: Duration) -> Result<Client> {
    create_client_with(timeout, &HttpClientPoolConfig::default())
}

/// Create a client with explicit pool settings
pub fn create_client_with(timeout: Duration, config: &HttpClientPoolConfig) -> Result<Client> {
    debug!(timeout_ms = timeout.as_millis() as u64, "Creating HTTP client");

    let client = ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .timeout(timeout)
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keepalive)
        .tcp_nodelay(true)
        .user_agent(config.user_agent.as_str())
        .build()?;

    Ok(client)
}
