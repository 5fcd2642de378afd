//! Core slicing protocol types and arithmetic.
//!
//! Everything in this module is pure: descriptors are immutable value
//! objects and `compute_slices` is deterministic with no I/O. The wire
//! schema (`{"id":<int>,"max":<int>}`) is fixed by the serde field names
//! and shared by the publisher, the consumers, and the dead-letter path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of documents matching the target index at probe time.
///
/// Transient: read once per fan-out run and consumed immediately by
/// `compute_slices`. Not guaranteed consistent with the later slice scan
/// if the backend mutates concurrently.
pub type DocumentCount = u64;

/// One unit of fan-out work: which backend slice a worker must scan.
///
/// `max` is the total number of slices in the run and is identical across
/// every descriptor of that run. The backend assigns each document to
/// exactly one of `max` partitions, so descriptors are embarrassingly
/// parallel by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkDescriptor {
    /// 0-indexed slice identifier, unique within a run.
    pub id: u32,
    /// Total slice count for the run, >= 1 for any valid descriptor.
    pub max: u32,
}

impl WorkDescriptor {
    #[must_use]
    pub fn new(id: u32, max: u32) -> Self {
        Self { id, max }
    }

    /// Check the published-descriptor invariant `0 <= id < max`.
    ///
    /// A descriptor that fails this check is a poison message: consumers
    /// must dead-letter it without issuing a backend call.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id < self.max
    }
}

impl fmt::Display for WorkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slice {}/{}", self.id, self.max)
    }
}

/// Derive the slice descriptors for one fan-out run.
///
/// `slice_count = floor(total / page_size)`. Exactly that many descriptors
/// are produced, with `id` ranging `0..slice_count` and a constant `max`.
///
/// When `total < page_size` the result is empty: no partial or remainder
/// slice is ever created. This drops up to `page_size - 1` trailing
/// documents per run and is preserved deliberately for compatibility with
/// the reference behavior; callers needing full coverage must treat that
/// as an extension, not a bug fix here.
#[must_use]
pub fn compute_slices(total: DocumentCount, page_size: u32) -> Vec<WorkDescriptor> {
    debug_assert!(page_size > 0, "page_size is validated at config build");
    if page_size == 0 {
        return Vec::new();
    }

    // Descriptor ids are u32 on the wire; saturate rather than wrap for
    // counts beyond what any real index produces.
    let slice_count = u32::try_from(total / u64::from(page_size)).unwrap_or(u32::MAX);

    (0..slice_count)
        .map(|id| WorkDescriptor::new(id, slice_count))
        .collect()
}
