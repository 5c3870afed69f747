//! Test fixtures and factories

use super::ScriptedTransport;
use blest_batch::core::IdGenerator;
use blest_batch::{BlestClient, ClientConfig, RequestId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Ids `r1`, `r2`, ... in issue order
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> RequestId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        RequestId::new(format!("r{}", n))
    }
}

pub fn test_config(max_batch_size: usize) -> ClientConfig {
    ClientConfig::new("http://localhost:8080")
        .with_max_batch_size(max_batch_size)
        .with_buffer_delay(Duration::from_millis(10))
}

/// Client over `transport` with sequential ids; needs a running tokio runtime
pub fn test_client(transport: &Arc<ScriptedTransport>, max_batch_size: usize) -> BlestClient {
    BlestClient::builder(test_config(max_batch_size))
        .transport(transport.clone())
        .id_generator(Arc::new(SequentialIds::default()))
        .build()
        .expect("test client")
}
