//! Caller-facing batching client
//!
//! [`BlestClient`] is the service object application code holds. Every call
//! to [`BlestClient::request`] or a [`LazyRequest`] trigger returns at once;
//! the calls made within one debounce window travel together in as few
//! batches as `max_batch_size` allows, and each caller observes only its own
//! outcome through an [`OutcomeView`].
//!
//! ```rust,no_run
//! use blest_batch::{BlestClient, ClientConfig, RequestOptions};
//! use serde_json::json;
//!
//! # async fn run() -> blest_batch::Result<()> {
//! let client = BlestClient::new(ClientConfig::new("http://localhost:8080"))?;
//!
//! let mut hello = client.request("hello", None, RequestOptions::new());
//! let mut greet = client.request("greet", Some(json!({"name": "Steve"})), RequestOptions::new());
//!
//! let hello = hello.settled().await;
//! let greet = greet.settled().await;
//! println!("{:?} {:?}", hello, greet);
//!
//! client.dispose();
//! # Ok(())
//! # }
//! ```

mod handle;
mod view;

pub use handle::{LazyRequest, RequestHandle};
pub use view::OutcomeView;

use crate::config::{ClientConfig, Validate};
use crate::core::engine::BatchEngine;
use crate::core::id::{IdGenerator, UuidGenerator};
use crate::core::store::Snapshot;
use crate::core::transport::{HttpTransport, Transport};
use crate::core::types::{RequestDescriptor, RequestId, RequestOptions, RequestOutcome};
use crate::utils::error::{BlestError, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Batching client. Cheap to clone; clones share one engine.
///
/// Dropping the last clone (and every handle derived from it) cancels the
/// armed flush timer. Call [`BlestClient::dispose`] to tear down explicitly.
#[derive(Clone)]
pub struct BlestClient {
    config: Arc<ClientConfig>,
    engine: BatchEngine,
    ids: Arc<dyn IdGenerator>,
}

impl BlestClient {
    /// Client with the default HTTP transport, UUID ids and the current runtime
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> BlestClientBuilder {
        BlestClientBuilder::new(config)
    }

    /// Issue a request now and follow its outcome.
    ///
    /// With `options.skip` nothing is sent; the handle reports the idle
    /// default until [`RequestHandle::refresh`] is called.
    pub fn request(
        &self,
        route: impl Into<String>,
        parameters: Option<Value>,
        options: RequestOptions,
    ) -> RequestHandle {
        RequestHandle::issue(self.clone(), route.into(), parameters, options)
    }

    /// Deferred request: a trigger plus a view that follows the trigger's
    /// latest execution. The view is idle until the first execution.
    pub fn lazy_request(
        &self,
        route: impl Into<String>,
        options: RequestOptions,
    ) -> (LazyRequest, OutcomeView) {
        LazyRequest::new(self.clone(), route.into(), options)
    }

    /// Send everything queued now instead of waiting for the debounce window
    pub fn flush(&self) -> Vec<JoinHandle<()>> {
        self.engine.flush()
    }

    /// Cancel the pending flush and settle queued requests with a `Disposed` error
    pub fn dispose(&self) {
        self.engine.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.engine.is_disposed()
    }

    /// Current outcome of any id
    pub fn outcome(&self, id: &RequestId) -> RequestOutcome {
        self.engine.snapshot().outcome(id)
    }

    /// Current snapshot of every tracked outcome
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.engine.snapshot()
    }

    /// Raw snapshot subscription
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.engine.subscribe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn engine(&self) -> &BatchEngine {
        &self.engine
    }

    pub(crate) fn next_id(&self) -> RequestId {
        self.ids.next_id()
    }

    pub(crate) fn submit(
        &self,
        id: RequestId,
        route: &str,
        parameters: Option<Value>,
        options: &RequestOptions,
    ) {
        self.engine.enqueue(RequestDescriptor::new(
            id,
            route,
            parameters,
            options.blest_headers(),
        ));
    }
}

impl std::fmt::Debug for BlestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlestClient")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BlestClient`] with pluggable transport, id source and runtime
pub struct BlestClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    ids: Option<Arc<dyn IdGenerator>>,
    runtime: Option<Handle>,
}

impl BlestClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            ids: None,
            runtime: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<BlestClient> {
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| BlestError::Runtime(e.to_string()))?,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.request_timeout)?),
        };
        let ids = self.ids.unwrap_or_else(|| Arc::new(UuidGenerator));

        info!(
            url = %self.config.url,
            max_batch_size = self.config.max_batch_size,
            buffer_delay_ms = self.config.buffer_delay.as_millis() as u64,
            "Creating batching client"
        );

        let engine = BatchEngine::new(&self.config, transport, runtime);
        Ok(BlestClient {
            config: Arc::new(self.config),
            engine,
            ids,
        })
    }
}
