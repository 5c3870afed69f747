//! Error handling for the batching client
//!
//! Engine failures are never raised to callers of `request`; they are folded
//! into the `error` field of each affected outcome. `BlestError` is what the
//! transport, configuration and runtime layers return before that happens.

mod conversions;
mod helpers;
mod types;

pub use types::{BlestError, Result};
