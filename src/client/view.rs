//! Live, per-request views over the outcome store

use crate::core::store::Snapshot;
use crate::core::types::{RequestId, RequestOutcome};
use arc_swap::ArcSwapOption;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared slot naming the id a view currently follows
pub(crate) type Binding = Arc<ArcSwapOption<RequestId>>;

pub(crate) fn binding(id: Option<RequestId>) -> Binding {
    Arc::new(ArcSwapOption::from(id.map(Arc::new)))
}

/// Live view of one request's outcome.
///
/// Derived from store snapshots: an unbound view, or one whose id has no
/// entry yet, reports the idle default. Consecutive equal outcomes are
/// reported once.
#[derive(Debug, Clone)]
pub struct OutcomeView {
    receiver: watch::Receiver<Arc<Snapshot>>,
    binding: Binding,
    last: Option<RequestOutcome>,
}

impl OutcomeView {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>, binding: Binding) -> Self {
        Self {
            receiver,
            binding,
            last: None,
        }
    }

    /// Id the view currently follows
    pub fn id(&self) -> Option<RequestId> {
        self.binding.load_full().map(|id| (*id).clone())
    }

    /// Outcome as of the latest snapshot
    pub fn current(&self) -> RequestOutcome {
        let snapshot = self.receiver.borrow();
        self.derive(&snapshot)
    }

    /// Next distinct outcome.
    ///
    /// The first call returns the current outcome immediately; later calls
    /// wait until it changes. Returns `None` once the client is gone and no
    /// further change can happen.
    pub async fn next(&mut self) -> Option<RequestOutcome> {
        if self.last.is_none() {
            let outcome = self.mark_current();
            self.last = Some(outcome.clone());
            return Some(outcome);
        }

        loop {
            self.receiver.changed().await.ok()?;
            let outcome = self.mark_current();
            if self.last.as_ref() != Some(&outcome) {
                self.last = Some(outcome.clone());
                return Some(outcome);
            }
        }
    }

    /// Wait until the outcome is no longer loading.
    ///
    /// An unbound or skipped view is already settled at its idle default.
    pub async fn settled(&mut self) -> Option<RequestOutcome> {
        loop {
            let outcome = self.mark_current();
            if !outcome.loading {
                self.last = Some(outcome.clone());
                return Some(outcome);
            }
            self.receiver.changed().await.ok()?;
        }
    }

    /// Stream of distinct outcomes, starting with the current one
    pub fn into_stream(self) -> impl Stream<Item = RequestOutcome> + Send + 'static {
        async_stream::stream! {
            let mut view = self;
            while let Some(outcome) = view.next().await {
                yield outcome;
            }
        }
    }

    fn mark_current(&mut self) -> RequestOutcome {
        let snapshot = self.receiver.borrow_and_update().clone();
        self.derive(&snapshot)
    }

    fn derive(&self, snapshot: &Snapshot) -> RequestOutcome {
        match self.binding.load().as_deref() {
            Some(id) => snapshot.outcome(id),
            None => RequestOutcome::idle(),
        }
    }
}
