//! Scripted in-memory transport

use async_trait::async_trait;
use blest_batch::Result;
use blest_batch::core::{BatchRequest, BatchResultItem, Transport};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

type Responder = Box<dyn Fn(&BatchRequest) -> Result<Vec<BatchResultItem>> + Send + Sync>;

/// Records every batch it is asked to send and answers through a responder
pub struct ScriptedTransport {
    requests: Mutex<Vec<BatchRequest>>,
    responder: Responder,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&BatchRequest) -> Result<Vec<BatchResultItem>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every item with `{"route": .., "params": ..}`
    pub fn echo() -> Arc<Self> {
        Self::new(|request| Ok(echo_items(request)))
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().clone()
    }

    /// Ids of every batch sent, ordered by their first id
    pub fn batches(&self) -> Vec<Vec<String>> {
        let mut batches: Vec<Vec<String>> = self
            .requests
            .lock()
            .iter()
            .map(|r| r.ids().map(|id| id.to_string()).collect())
            .collect();
        batches.sort();
        batches
    }

    pub fn batch_count(&self) -> usize {
        self.requests.lock().len()
    }
}

/// Successful echo result for every item of `request`
pub fn echo_items(request: &BatchRequest) -> Vec<BatchResultItem> {
    request
        .items
        .iter()
        .map(|item| {
            BatchResultItem::success(
                item.id.clone(),
                &item.route,
                json!({"route": item.route, "params": item.parameters}),
            )
        })
        .collect()
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &BatchRequest) -> Result<Vec<BatchResultItem>> {
        self.requests.lock().push(request.clone());
        (self.responder)(request)
    }
}
