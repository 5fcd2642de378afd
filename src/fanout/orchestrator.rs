//! Top-level fan-out trigger: count, slice, publish.

use crate::backend::{BackendError, SearchBackend};
use crate::channel::WorkChannel;
use crate::protocol::{DocumentCount, compute_slices};

use super::publisher::publish_descriptors;

/// Failures that abort an entire fan-out run.
///
/// Surfaced synchronously to whatever triggered the run; per-slice
/// failures after the publish step never appear here (they are isolated
/// in the consumer pool and visible only via the dead-letter path).
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// The count probe could not establish the document total.
    #[error("count probe failed: {0}")]
    CountProbe(#[source] BackendError),

    /// The backend client could not be constructed.
    #[error("backend client setup failed: {0}")]
    Setup(#[source] BackendError),

    /// The work channel closed before the batch finished publishing.
    #[error("work channel closed before the run was fully published")]
    ChannelClosed,
}

/// What one triggered run did, as reported back to the trigger.
#[derive(Debug, Clone, Copy)]
pub struct FanoutReport {
    /// Document total the run was computed from.
    pub total: DocumentCount,
    /// Slices derived from the total.
    pub slice_count: u32,
    /// Descriptors successfully enqueued.
    pub published: u32,
    /// Descriptors dropped by the best-effort publisher.
    pub failed_sends: u32,
}

/// Execute one fan-out run: probe the count, compute the slices, publish
/// one work descriptor per slice.
///
/// Fail-fast with no internal retries: a count or channel failure aborts
/// the run and surfaces to the caller. Once descriptors are published the
/// run is fire-and-forget — there is no way to cancel in-flight slices.
pub async fn run_fanout(
    backend: &SearchBackend,
    channel: &WorkChannel,
    page_size: u32,
) -> Result<FanoutReport, FanoutError> {
    log::debug!("fan-out run triggered (page_size {page_size})");

    let total = backend.count().await.map_err(FanoutError::CountProbe)?;
    let descriptors = compute_slices(total, page_size);
    let slice_count = descriptors.len() as u32;
    log::info!(
        "fan-out: {total} documents in {}, {slice_count} slices of page size {page_size}",
        backend.index(),
    );

    if descriptors.is_empty() {
        log::info!("total below page size, nothing to fan out");
        return Ok(FanoutReport {
            total,
            slice_count: 0,
            published: 0,
            failed_sends: 0,
        });
    }

    let outcome =
        publish_descriptors(channel, &descriptors).map_err(|_| FanoutError::ChannelClosed)?;
    if outcome.has_failures() {
        log::warn!(
            "published {}/{} descriptors ({} dropped)",
            outcome.published,
            outcome.total,
            outcome.failed,
        );
    }

    Ok(FanoutReport {
        total,
        slice_count,
        published: outcome.published as u32,
        failed_sends: outcome.failed as u32,
    })
}
