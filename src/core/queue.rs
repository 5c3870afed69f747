//! Pending queue of not-yet-dispatched requests

use super::types::RequestDescriptor;

/// Ordered buffer of descriptors awaiting the next flush.
///
/// Queue order is enqueue order, which fixes chunk membership.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: Vec<RequestDescriptor>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: RequestDescriptor) {
        self.items.push(descriptor);
    }

    /// Take every queued descriptor, leaving the queue empty
    pub fn drain(&mut self) -> Vec<RequestDescriptor> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
