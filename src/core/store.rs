//! Correlated state store
//!
//! Maps request ids to their latest [`RequestOutcome`]. The current mapping is
//! held as an immutable, versioned [`Snapshot`] inside a `watch` channel; each
//! publish replaces it atomically, so a snapshot handed out earlier never
//! changes underneath its holder.

use super::types::{RequestId, RequestOutcome};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Immutable view of every tracked outcome at one version
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    version: u64,
    outcomes: HashMap<RequestId, RequestOutcome>,
    // Terminal ids in the order they settled, oldest first
    settled: VecDeque<RequestId>,
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &RequestId) -> Option<&RequestOutcome> {
        self.outcomes.get(id)
    }

    /// Outcome for `id`, or the idle default when the id has no entry
    pub fn outcome(&self, id: &RequestId) -> RequestOutcome {
        self.outcomes.get(id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.outcomes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of ids still waiting on their batch
    pub fn pending_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.loading).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &RequestOutcome)> {
        self.outcomes.iter()
    }

    /// Record `outcome` for `id`. Settlement order is only kept when
    /// `track_settled` is set, i.e. when a retention cap will consume it.
    fn apply(&mut self, id: RequestId, outcome: RequestOutcome, track_settled: bool) {
        if !track_settled {
            self.outcomes.insert(id, outcome);
            return;
        }

        let terminal = outcome.is_terminal();
        let previous = self.outcomes.insert(id.clone(), outcome);
        let was_terminal = previous.is_some_and(|p| p.is_terminal());
        if terminal && !was_terminal {
            self.settled.push_back(id);
        }
    }

    fn evict(&mut self, max_retained: usize) -> usize {
        let mut evicted = 0;
        while self.settled.len() > max_retained {
            let Some(id) = self.settled.pop_front() else {
                break;
            };
            if self.outcomes.get(&id).is_some_and(|o| o.is_terminal()) {
                self.outcomes.remove(&id);
                evicted += 1;
            }
        }
        evicted
    }
}

/// Single-writer, multi-reader store of request outcomes
#[derive(Debug)]
pub struct StateStore {
    sender: watch::Sender<Arc<Snapshot>>,
    max_retained: Option<usize>,
}

impl StateStore {
    /// Create an empty store. `max_retained` caps how many terminal outcomes are kept.
    pub fn new(max_retained: Option<usize>) -> Self {
        let (sender, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            sender,
            max_retained,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.sender.borrow().clone()
    }

    /// Receiver notified on every subsequent publish
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Apply every update and publish the result as one new snapshot.
    ///
    /// Returns the version of the published snapshot.
    pub fn publish<I>(&self, updates: I) -> u64
    where
        I: IntoIterator<Item = (RequestId, RequestOutcome)>,
    {
        let mut version = 0;
        let max_retained = self.max_retained;

        self.sender.send_modify(|current| {
            let next = Arc::make_mut(current);
            let mut applied = 0usize;
            for (id, outcome) in updates {
                next.apply(id, outcome, max_retained.is_some());
                applied += 1;
            }
            let evicted = max_retained.map_or(0, |max| next.evict(max));
            next.version += 1;
            version = next.version;
            trace!(version, applied, evicted, "Published snapshot");
        });

        version
    }

    /// Publish a single update
    pub fn set(&self, id: RequestId, outcome: RequestOutcome) -> u64 {
        self.publish(std::iter::once((id, outcome)))
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(None)
    }
}
