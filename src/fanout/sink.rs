//! Pluggable destination for per-slice results.
//!
//! The slicing protocol never merges or reduces slice output; each page is
//! handed to a sink and forgotten. Downstream aggregation strategies
//! (stream to storage, accumulate, …) plug in here without touching the
//! protocol itself.

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::backend::SlicePage;
use crate::protocol::WorkDescriptor;

/// Destination for the pages a slice scan produces.
///
/// `handle` is invoked once per retrieved page (once per slice in the
/// default single-page mode). Implementations must be safe to call
/// concurrently from many workers.
pub trait SliceSink: Send + Sync {
    fn handle(&self, slice: WorkDescriptor, page: SlicePage) -> BoxFuture<'_, ()>;
}

/// Reference sink: log the page size and discard it.
#[derive(Debug, Default)]
pub struct LogSink;

impl SliceSink for LogSink {
    fn handle(&self, slice: WorkDescriptor, page: SlicePage) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            log::info!("{slice}: received {} documents (discarding)", page.len());
        })
    }
}

/// Sink that retains every page in memory.
///
/// Useful for demos and tests; unsuitable for result sets that motivated
/// slicing in the first place.
#[derive(Debug, Default)]
pub struct CollectSink {
    pages: Mutex<Vec<(WorkDescriptor, SlicePage)>>,
}

impl CollectSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors of the pages collected so far, in arrival order.
    #[must_use]
    pub fn slices(&self) -> Vec<WorkDescriptor> {
        self.pages.lock().iter().map(|(slice, _)| *slice).collect()
    }

    /// Total documents across all collected pages.
    #[must_use]
    pub fn total_documents(&self) -> usize {
        self.pages.lock().iter().map(|(_, page)| page.len()).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }
}

impl SliceSink for CollectSink {
    fn handle(&self, slice: WorkDescriptor, page: SlicePage) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.pages.lock().push((slice, page));
        })
    }
}
