//! Batch splitting: drained queue into bounded, order-preserving chunks

/// Partition `items` into consecutive chunks of at most `max_batch_size`.
///
/// Yields `ceil(len / max_batch_size)` chunks whose concatenation is the
/// input in its original order. A zero size is treated as one.
pub fn split_into_chunks<T>(items: Vec<T>, max_batch_size: usize) -> Vec<Vec<T>> {
    let size = max_batch_size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();

    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }

    chunks
}
