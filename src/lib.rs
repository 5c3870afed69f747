//! # blest-batch
//!
//! Client-side request batching for BLEST-style HTTP endpoints.
//!
//! Application code fires many small remote calls; the client coalesces the
//! calls made within a short debounce window into a few batched HTTP POSTs
//! and routes each result back to the caller that asked for it.
//!
//! ## Features
//!
//! - **Debounced batching**: one timer per window, armed by the first call
//! - **Bounded batches**: queued calls are split into chunks of `max_batch_size`
//! - **Failure isolation**: a failed chunk only affects its own requests
//! - **Live views**: every caller observes `{loading, error, data}` for its own id
//! - **Refresh and lazy requests**: re-issue a call, or defer it until triggered
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blest_batch::{BlestClient, ClientConfig, RequestOptions, Selector};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:8080")
//!         .with_max_batch_size(10)
//!         .with_buffer_delay(Duration::from_millis(5));
//!     let client = BlestClient::new(config)?;
//!
//!     let mut user = client.request(
//!         "user",
//!         Some(json!({"id": 7})),
//!         RequestOptions::new().with_select(Selector::fields(["name", "email"])),
//!     );
//!     if let Some(outcome) = user.settled().await {
//!         println!("{:?}", outcome.data);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use client::{BlestClient, BlestClientBuilder, LazyRequest, OutcomeView, RequestHandle};
pub use config::ClientConfig;
pub use core::{
    BatchEngine, HttpTransport, IdGenerator, OutcomeError, OutcomeErrorKind, RequestId,
    RequestOptions, RequestOutcome, Selector, SelectorNode, Snapshot, Transport,
};
pub use utils::error::{BlestError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Version line with build metadata, as printed by `blest --version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (git ",
    env!("BLEST_GIT_HASH"),
    ", built ",
    env!("BLEST_BUILD_TIME"),
    ", ",
    env!("BLEST_RUST_VERSION"),
    ")"
);

/// Build metadata recorded by the build script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Seconds since the Unix epoch
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BLEST_BUILD_TIME"),
            git_hash: env!("BLEST_GIT_HASH"),
            rust_version: env!("BLEST_RUST_VERSION"),
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (git {}, built {}, {})",
            self.version, self.git_hash, self.build_time, self.rust_version
        )
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
