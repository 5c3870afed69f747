//! Flush scheduler: one debounce timer per engine
//!
//! The first enqueue into an idle engine arms the timer. Later enqueues while
//! it is armed do not re-arm it, so a long burst still flushes on schedule
//! instead of starving. Every armed timer carries a generation so that a
//! timer task which lost a race with `cancel` cannot clear its successor.

use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    handle: AbortHandle,
}

/// Single-shot debounce timer
#[derive(Debug)]
pub struct FlushScheduler {
    delay: Duration,
    generation: u64,
    armed: Option<ArmedTimer>,
}

impl FlushScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            armed: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Arm the timer unless it already is.
    ///
    /// `on_fire` receives the generation of the new timer and builds the
    /// future that runs once the delay elapses. Returns that generation, or
    /// `None` when a timer was already armed.
    pub fn arm<F, Fut>(&mut self, runtime: &Handle, on_fire: F) -> Option<u64>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.armed.is_some() {
            return None;
        }

        self.generation += 1;
        let generation = self.generation;
        let delay = self.delay;
        let fire = on_fire(generation);

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire.await;
        });

        trace!(generation, delay_ms = delay.as_millis() as u64, "Armed flush timer");
        self.armed = Some(ArmedTimer {
            generation,
            handle: task.abort_handle(),
        });
        Some(generation)
    }

    /// Called by a firing timer. Clears the handle and returns true only if
    /// `generation` is the timer currently armed.
    pub fn fire(&mut self, generation: u64) -> bool {
        match &self.armed {
            Some(timer) if timer.generation == generation => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    /// Abort the armed timer, if any. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(timer) => {
                timer.handle.abort();
                trace!(generation = timer.generation, "Cancelled flush timer");
                true
            }
            None => false,
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
