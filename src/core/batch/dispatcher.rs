//! Batch dispatch: one independent network call per chunk

use super::demux::resolve_chunk;
use super::splitter::split_into_chunks;
use super::types::{BatchItem, BatchRequest};
use crate::core::store::StateStore;
use crate::core::transport::Transport;
use crate::core::types::{RequestDescriptor, RequestId};
use crate::utils::error::BlestError;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span};

const CONTENT_TYPE: &str = "Content-Type";
const ACCEPT: &str = "Accept";
const APPLICATION_JSON: &str = "application/json";

/// Merge configured headers with the JSON content headers, which always win.
pub fn merge_headers(configured: &HashMap<String, String>) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = configured
        .iter()
        .filter(|(name, _)| {
            !name.eq_ignore_ascii_case(CONTENT_TYPE) && !name.eq_ignore_ascii_case(ACCEPT)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
    headers.insert(ACCEPT.to_string(), APPLICATION_JSON.to_string());
    headers
}

/// Splits drained queues into chunks and sends each one on its own task
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    url: String,
    headers: HashMap<String, String>,
    max_batch_size: usize,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        url: impl Into<String>,
        configured_headers: &HashMap<String, String>,
        max_batch_size: usize,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            headers: merge_headers(configured_headers),
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Wire request for one chunk
    pub fn build_request(&self, chunk: Vec<RequestDescriptor>) -> BatchRequest {
        BatchRequest {
            url: self.url.clone(),
            headers: self.headers.clone(),
            items: chunk.into_iter().map(BatchItem::from).collect(),
        }
    }

    /// Chunk `drained` and spawn one dispatch per chunk.
    ///
    /// Chunks never wait on each other; each one publishes its own ids'
    /// outcomes to `store` when its call completes or fails.
    pub fn dispatch(
        &self,
        runtime: &Handle,
        store: &Arc<StateStore>,
        drained: Vec<RequestDescriptor>,
    ) -> Vec<JoinHandle<()>> {
        let total = drained.len();
        let chunks = split_into_chunks(drained, self.max_batch_size);
        debug!(
            requests = total,
            batches = chunks.len(),
            max_batch_size = self.max_batch_size,
            "Flushing pending queue"
        );

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let request = self.build_request(chunk);
                let span = debug_span!("blest_batch", batch = index, size = request.len());
                let transport = self.transport.clone();
                let store = store.clone();
                runtime.spawn(run_chunk(transport, store, request).instrument(span))
            })
            .collect()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("max_batch_size", &self.max_batch_size)
            .finish_non_exhaustive()
    }
}

/// Send one chunk and publish the outcome of every id in it as one snapshot
pub async fn run_chunk(
    transport: Arc<dyn Transport>,
    store: Arc<StateStore>,
    request: BatchRequest,
) {
    let ids: Vec<RequestId> = request.ids().cloned().collect();
    debug!(size = ids.len(), "Dispatching batch");

    let result = AssertUnwindSafe(async { transport.send(&request).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(BlestError::Runtime("transport panicked".to_string())));

    let updates = resolve_chunk(&ids, result);
    let version = store.publish(updates);
    debug!(size = ids.len(), version, "Batch settled");
}
