//! Core configuration type and default constants for fan-out runs.

use url::Url;

/// Canonical page size used to derive the slice count (`floor(total / page_size)`).
///
/// Fixed configuration, never derived from the dataset.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Documents fetched per scroll batch inside one slice.
///
/// This is the backend's per-request ceiling for scroll pages and is
/// deliberately much larger than the slicing page size: one batch covers
/// the whole slice in the default single-page mode.
pub const SCROLL_BATCH_SIZE: u32 = 10_000;

/// Field the slice scan sorts on, ascending.
pub const DEFAULT_SORT_FIELD: &str = "timestamp";

/// Keep-alive window for scroll cursors.
pub const SCROLL_KEEP_ALIVE: &str = "1m";

/// Default consumer-side concurrency for the work channel subscription.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default bound of the in-process work channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Deliveries attempted per descriptor before dead-lettering.
///
/// Attempt 1 is the initial delivery, so the default of 3 allows two
/// redeliveries for transient failures.
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Default bound of the dead-letter channel.
pub const DEFAULT_DEAD_LETTER_CAPACITY: usize = 256;

/// Default timeout for every backend HTTP request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default concurrent insert bound for the seed generator.
pub const DEFAULT_SEED_CONCURRENCY: usize = 16;

/// Configuration for one fan-out deployment.
///
/// Immutable once built; shared by reference across the orchestrator,
/// the consumer pool, and the backend client.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Base URL of the search backend, e.g. `http://localhost:9200`.
    pub(crate) backend_url: Url,
    /// Target collection for counting, slicing, and seeding.
    pub(crate) index: String,
    /// Slicing page size; `slice_count = floor(total / page_size)`.
    pub(crate) page_size: u32,
    /// Per-request scroll batch size.
    pub(crate) scroll_batch_size: u32,
    /// Sort key of the slice scan.
    pub(crate) sort_field: String,
    /// Scroll cursor keep-alive, backend syntax (e.g. `1m`).
    pub(crate) scroll_keep_alive: String,
    /// Number of concurrent consumer tasks.
    pub(crate) worker_count: usize,
    /// Bound of the work channel.
    pub(crate) channel_capacity: usize,
    /// Delivery attempts per descriptor before dead-lettering.
    pub(crate) max_delivery_attempts: u32,
    /// Bound of the dead-letter channel.
    pub(crate) dead_letter_capacity: usize,
    /// Timeout applied to every backend request.
    pub(crate) request_timeout_secs: u64,
    /// Follow the scroll cursor past the first page.
    ///
    /// Off by default: the reference behavior retrieves only the first
    /// scroll batch of each slice and stops.
    pub(crate) scroll_to_exhaustion: bool,
    /// Concurrent insert bound for the seed generator.
    pub(crate) seed_concurrency: usize,
}
