//! Utility modules for the batching client
//!
//! - **error**: error taxonomy and conversions into outcome errors
//! - **logging**: subscriber setup for binaries
//! - **net**: HTTP client construction

pub mod error;
pub mod logging;
pub mod net;

pub use error::{BlestError, Result};
pub use logging::{LoggingConfig, init_logging};

const ELLIPSIS: &str = "...";

/// Truncate string to at most `max_len` bytes on a char boundary.
///
/// An ellipsis marks the cut when it fits; below three bytes the string is
/// cut without one.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let (budget, suffix) = if max_len >= ELLIPSIS.len() {
        (max_len - ELLIPSIS.len(), ELLIPSIS)
    } else {
        (max_len, "")
    };
    let mut end = budget;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}
