//! Batching engine
//!
//! Owns the pending queue, the flush timer and the outcome store for one
//! client. Enqueue is synchronous and never performs I/O: it publishes the
//! pending outcome, appends to the queue and arms the timer, all under one
//! lock so a concurrent flush sees either none or all of it.

use super::batch::Dispatcher;
use super::queue::PendingQueue;
use super::scheduler::FlushScheduler;
use super::store::{Snapshot, StateStore};
use super::transport::Transport;
use super::types::{OutcomeError, RequestDescriptor, RequestOutcome};
use crate::config::ClientConfig;
use crate::utils::error::BlestError;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

#[derive(Debug)]
struct EngineState {
    queue: PendingQueue,
    scheduler: FlushScheduler,
    disposed: bool,
}

#[derive(Debug)]
struct EngineInner {
    store: Arc<StateStore>,
    state: Mutex<EngineState>,
    dispatcher: Dispatcher,
    runtime: Handle,
}

/// Cheaply cloneable handle to one batching engine
#[derive(Debug, Clone)]
pub struct BatchEngine {
    inner: Arc<EngineInner>,
}

impl BatchEngine {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        let dispatcher = Dispatcher::new(
            transport,
            config.url.clone(),
            &config.headers,
            config.max_batch_size,
        );

        Self {
            inner: Arc::new(EngineInner {
                store: Arc::new(StateStore::new(config.max_retained_outcomes)),
                state: Mutex::new(EngineState {
                    queue: PendingQueue::new(),
                    scheduler: FlushScheduler::new(config.buffer_delay),
                    disposed: false,
                }),
                dispatcher,
                runtime,
            }),
        }
    }

    /// Queue a request for the next flush and mark it pending.
    ///
    /// After `dispose` the request settles immediately with a `Disposed` error.
    pub fn enqueue(&self, descriptor: RequestDescriptor) {
        let mut state = self.inner.state.lock();

        if state.disposed {
            debug!(id = %descriptor.id, "Request issued after dispose");
            self.inner.store.set(
                descriptor.id,
                RequestOutcome::failure(OutcomeError::from(BlestError::Disposed)),
            );
            return;
        }

        self.inner
            .store
            .set(descriptor.id.clone(), RequestOutcome::pending());
        trace!(id = %descriptor.id, route = %descriptor.route, "Enqueued request");
        state.queue.push(descriptor);

        let weak = Arc::downgrade(&self.inner);
        state
            .scheduler
            .arm(&self.inner.runtime, move |generation| on_timer(weak, generation));
    }

    /// Drain the queue now instead of waiting for the timer.
    ///
    /// Returns the dispatch task of every chunk sent.
    pub fn flush(&self) -> Vec<JoinHandle<()>> {
        let drained = {
            let mut state = self.inner.state.lock();
            state.scheduler.cancel();
            state.queue.drain()
        };
        self.inner.dispatch(drained)
    }

    /// Cancel the armed timer and settle every queued request with a
    /// `Disposed` error. In-flight batches still complete.
    pub fn dispose(&self) {
        let drained = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.scheduler.cancel();
            state.queue.drain()
        };

        info!(discarded = drained.len(), "Disposing batching engine");
        if drained.is_empty() {
            return;
        }

        let error = OutcomeError::from(BlestError::Disposed);
        self.inner.store.publish(
            drained
                .into_iter()
                .map(|d| (d.id, RequestOutcome::failure(error.clone()))),
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Number of requests waiting for the next flush
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.inner.state.lock().scheduler.is_armed()
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.store.subscribe()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

impl EngineInner {
    fn dispatch(&self, drained: Vec<RequestDescriptor>) -> Vec<JoinHandle<()>> {
        if drained.is_empty() {
            return Vec::new();
        }
        self.dispatcher.dispatch(&self.runtime, &self.store, drained)
    }
}

async fn on_timer(engine: Weak<EngineInner>, generation: u64) {
    let Some(engine) = engine.upgrade() else {
        return;
    };

    let drained = {
        let mut state = engine.state.lock();
        if !state.scheduler.fire(generation) {
            trace!(generation, "Ignoring stale flush timer");
            return;
        }
        state.queue.drain()
    };

    if drained.is_empty() {
        trace!(generation, "Flush timer fired on an empty queue");
        return;
    }
    engine.dispatch(drained);
}
