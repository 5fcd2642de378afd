//! Best-effort publisher for slice work descriptors.

use crate::channel::{ChannelError, WorkChannel, WorkMessage};
use crate::protocol::WorkDescriptor;

/// Result of publishing one batch of descriptors.
///
/// Always represents successful execution of the batch operation itself;
/// the fields report how many individual sends succeeded or failed. All
/// descriptors are attempted regardless of individual failures — partial
/// publish is accepted behavior and is never rolled back.
#[derive(Debug, Clone, Copy)]
pub struct PublishOutcome {
    /// Number of descriptors in the batch.
    pub total: usize,
    /// Descriptors successfully enqueued.
    pub published: usize,
    /// Descriptors that could not be enqueued.
    pub failed: usize,
}

impl PublishOutcome {
    /// True only if every descriptor was enqueued.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.published == self.total && self.failed == 0
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Publish descriptors onto the outbound work channel in `id`-ascending
/// order, one independent JSON message each.
///
/// A full channel fails only the affected descriptor: the failure is
/// logged, counted, and the batch continues. A closed channel aborts the
/// batch, since every remaining send would fail the same way.
///
/// # Errors
/// Returns `ChannelError::Closed` if the channel shut down mid-batch;
/// descriptors published before the closure stay in flight.
pub fn publish_descriptors(
    channel: &WorkChannel,
    descriptors: &[WorkDescriptor],
) -> Result<PublishOutcome, ChannelError> {
    let total = descriptors.len();
    let mut published = 0;
    let mut failed = 0;

    for descriptor in descriptors {
        let body = match serde_json::to_vec(descriptor) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("failed to serialize {descriptor}: {e}");
                failed += 1;
                continue;
            }
        };

        match channel.try_send(WorkMessage::json(body)) {
            Ok(()) => {
                log::debug!("published {descriptor}");
                published += 1;
            }
            Err(ChannelError::Full) => {
                log::warn!("work channel full, dropping {descriptor}");
                failed += 1;
            }
            Err(ChannelError::Closed) => return Err(ChannelError::Closed),
        }
    }

    Ok(PublishOutcome {
        total,
        published,
        failed,
    })
}
