//! Batch pipeline: splitting, dispatch and response demultiplexing

pub mod demux;
pub mod dispatcher;
pub mod splitter;
mod types;

pub use demux::resolve_chunk;
pub use dispatcher::{Dispatcher, merge_headers, run_chunk};
pub use splitter::split_into_chunks;
pub use types::{BatchItem, BatchRequest, BatchResultItem};
