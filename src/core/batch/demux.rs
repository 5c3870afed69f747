//! Response demultiplexing: one batch result back onto its request ids
//!
//! Updates are computed for exactly the ids of the dispatched chunk and
//! published by the caller as a single snapshot, so a completing chunk can
//! never interleave half-applied with another publish.

use super::types::BatchResultItem;
use crate::core::types::{OutcomeError, RequestId, RequestOutcome};
use crate::utils::error::BlestError;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Compute the terminal outcome of every id in a chunk.
///
/// - On success each returned item settles its id; ids the server never
///   mentioned settle with an `Unacknowledged` error; items naming ids
///   outside the chunk are ignored.
/// - On failure every id in the chunk settles with the same error.
pub fn resolve_chunk(
    chunk_ids: &[RequestId],
    result: Result<Vec<BatchResultItem>, BlestError>,
) -> Vec<(RequestId, RequestOutcome)> {
    match result {
        Ok(items) => resolve_items(chunk_ids, items),
        Err(err) => {
            warn!(
                batch_size = chunk_ids.len(),
                error = %err,
                "Batch dispatch failed"
            );
            let error = OutcomeError::from(&err);
            chunk_ids
                .iter()
                .map(|id| (id.clone(), RequestOutcome::failure(error.clone())))
                .collect()
        }
    }
}

fn resolve_items(
    chunk_ids: &[RequestId],
    items: Vec<BatchResultItem>,
) -> Vec<(RequestId, RequestOutcome)> {
    let expected: HashSet<&RequestId> = chunk_ids.iter().collect();
    // Later items for the same id win
    let mut results: HashMap<RequestId, RequestOutcome> = HashMap::with_capacity(items.len());

    for item in items {
        if !expected.contains(&item.id) {
            warn!(id = %item.id, "Ignoring result for a request outside this batch");
            continue;
        }
        results.insert(item.id, RequestOutcome::from_result(item.data, item.error));
    }

    chunk_ids
        .iter()
        .map(|id| {
            let outcome = results.remove(id).unwrap_or_else(|| {
                warn!(id = %id, "Batch response did not acknowledge request");
                RequestOutcome::failure(OutcomeError::unacknowledged(id))
            });
            (id.clone(), outcome)
        })
        .collect()
}
