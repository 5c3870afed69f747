//! Integration tests for blest-batch
//!
//! These tests drive the public client API. Engine tests run on paused tokio
//! time with a scripted transport; HTTP tests use a `wiremock` server.

pub mod batching_tests;
pub mod config_tests;
