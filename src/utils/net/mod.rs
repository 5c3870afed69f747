//! Network utilities
//!
//! HTTP client construction for the default transport.

pub mod http;

pub use http::*;
