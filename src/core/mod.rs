//! Core batching engine
//!
//! Data flows leaves first: the [`id`] source names a request, [`engine`]
//! records it as pending in the [`store`] and appends it to the [`queue`],
//! the [`scheduler`] fires after the debounce window, and [`batch`] splits
//! the drained queue, sends each chunk through the [`transport`] and writes
//! the per-request results back into the store.

pub mod batch;
pub mod engine;
pub mod id;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod transport;
pub mod types;

pub use batch::{BatchItem, BatchRequest, BatchResultItem};
pub use engine::BatchEngine;
pub use id::{IdGenerator, UuidGenerator};
pub use store::{Snapshot, StateStore};
pub use transport::{HttpTransport, Transport};
pub use types::{
    OutcomeError, OutcomeErrorKind, RequestDescriptor, RequestId, RequestOptions, RequestOutcome,
    Selector, SelectorNode,
};
