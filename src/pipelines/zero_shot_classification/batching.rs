//! Batch planning over request indices.

use std::ops::Range;

/// A contiguous half-open range `[start, start + size)` of request indices.
///
/// Batches are read-only views into the plan; they are never mutated after
/// planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub start: usize,
    pub size: usize,
}

impl Batch {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.size
    }
}

/// Partition `n` request indices into batches of at most `capacity`.
///
/// Every batch except possibly the last has exactly `capacity` items; the
/// last holds the remainder. `n = 0` yields an empty plan. Pure and
/// deterministic.
pub fn plan(n: usize, capacity: usize) -> Vec<Batch> {
    debug_assert!(capacity > 0, "batch capacity must be at least 1");

    let mut batches = Vec::with_capacity(n.div_ceil(capacity));
    let mut start = 0;
    while start < n {
        let size = capacity.min(n - start);
        batches.push(Batch { start, size });
        start += size;
    }
    batches
}
