//! Consumer pool executing sliced scroll searches.
//!
//! This is the heart of the fan-out: N worker tasks share one logical
//! channel subscription, each delivery is independently schedulable, and
//! there is no shared mutable state between slice executions. A worker
//! never retries by itself; it classifies the failure and either hands the
//! message back to the channel for redelivery or routes it to the
//! dead-letter path.

use std::sync::Arc;

use crate::backend::{BackendError, SearchBackend};
use crate::channel::{WorkChannel, WorkMessage, WorkReceiver};
use crate::config::FanoutConfig;
use crate::protocol::WorkDescriptor;

use super::dead_letter::{DeadLetterEntry, DeadLetterSink};
use super::sink::SliceSink;

/// Classification of a failed delivery.
///
/// Malformed work is poison: it can never succeed, so it skips the retry
/// budget and goes straight to the dead-letter path without a backend
/// call. Processing failures are assumed transient and eligible for
/// redelivery.
#[derive(Debug, thiserror::Error)]
pub enum WorkFailure {
    /// The payload did not decode, or the descriptor violates
    /// `0 <= id < max`.
    #[error("malformed work item: {0}")]
    Malformed(String),

    /// The sliced search failed against the backend.
    #[error("slice processing failed: {0}")]
    Processing(#[from] BackendError),
}

impl WorkFailure {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Processing(_))
    }
}

/// Pool of consumer tasks bound to one work channel subscription.
pub struct ConsumerPool {
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ConsumerPool {
    /// Spawn `config.worker_count()` consumer tasks.
    ///
    /// Workers run until the channel is shut down or closed.
    #[must_use]
    pub fn start(
        config: Arc<FanoutConfig>,
        backend: Arc<SearchBackend>,
        channel: WorkChannel,
        receiver: WorkReceiver,
        sink: Arc<dyn SliceSink>,
        dead_letters: DeadLetterSink,
    ) -> Self {
        let handles = (0..config.worker_count())
            .map(|worker_id| {
                let config = Arc::clone(&config);
                let backend = Arc::clone(&backend);
                let channel = channel.clone();
                let receiver = receiver.clone();
                let sink = Arc::clone(&sink);
                let dead_letters = dead_letters.clone();
                tokio::spawn(async move {
                    worker_loop(
                        worker_id,
                        config,
                        backend,
                        channel,
                        receiver,
                        sink,
                        dead_letters,
                    )
                    .await;
                })
            })
            .collect();

        Self { handles }
    }

    /// Wait for every worker to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("consumer task panicked: {e}");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    config: Arc<FanoutConfig>,
    backend: Arc<SearchBackend>,
    channel: WorkChannel,
    receiver: WorkReceiver,
    sink: Arc<dyn SliceSink>,
    dead_letters: DeadLetterSink,
) {
    log::debug!("consumer {worker_id} started");
    loop {
        let message = tokio::select! {
            msg = receiver.recv() => match msg {
                Some(message) => message,
                None => break,
            },
            () = channel.wait_for_shutdown() => break,
        };

        handle_delivery(
            worker_id,
            &config,
            &backend,
            &channel,
            sink.as_ref(),
            &dead_letters,
            message,
        )
        .await;
    }
    log::debug!("consumer {worker_id} exiting");
}

async fn handle_delivery(
    worker_id: usize,
    config: &FanoutConfig,
    backend: &SearchBackend,
    channel: &WorkChannel,
    sink: &dyn SliceSink,
    dead_letters: &DeadLetterSink,
    message: WorkMessage,
) {
    match process_delivery(config, backend, sink, &message).await {
        Ok(descriptor) => {
            log::debug!("consumer {worker_id}: {descriptor} done (attempt {})", message.attempt);
            channel.metrics().increment_delivered();
            channel.settle();
        }
        Err(failure) if failure.is_retryable() && message.attempt < channel.max_delivery_attempts() => {
            log::warn!(
                "consumer {worker_id}: attempt {}/{} failed, re-queueing: {failure}",
                message.attempt,
                channel.max_delivery_attempts(),
            );
            let next = message.next_attempt();
            if let Err(channel_err) = channel.redeliver(next.clone()).await {
                // Redelivery impossible; terminal after all.
                dead_letters
                    .record(DeadLetterEntry::from_message(
                        &next,
                        format!("redelivery failed ({channel_err}) after: {failure}"),
                    ))
                    .await;
                channel.metrics().increment_dead_lettered();
                channel.settle();
            }
        }
        Err(failure) => {
            log::error!(
                "consumer {worker_id}: giving up after attempt {}: {failure}",
                message.attempt,
            );
            dead_letters
                .record(DeadLetterEntry::from_message(&message, failure.to_string()))
                .await;
            channel.metrics().increment_dead_lettered();
            channel.settle();
        }
    }
}

/// Process one delivery end to end: decode, validate, search, sink.
///
/// Pure read against the backend, so reprocessing the same message after
/// a crash or redelivery is safe.
async fn process_delivery(
    config: &FanoutConfig,
    backend: &SearchBackend,
    sink: &dyn SliceSink,
    message: &WorkMessage,
) -> Result<WorkDescriptor, WorkFailure> {
    let descriptor: WorkDescriptor = serde_json::from_slice(&message.body)
        .map_err(|e| WorkFailure::Malformed(format!("undecodable payload: {e}")))?;

    if !descriptor.is_valid() {
        return Err(WorkFailure::Malformed(format!(
            "slice id {} out of range for max {}",
            descriptor.id, descriptor.max
        )));
    }

    let first = backend
        .sliced_scroll(descriptor, config.scroll_batch_size(), config.sort_field())
        .await?;

    let mut cursor = first.scroll_id.clone();
    let mut fetched = first.len();
    sink.handle(descriptor, first).await;

    if config.scroll_to_exhaustion() {
        while let Some(scroll_id) = cursor {
            let page = backend.continue_scroll(&scroll_id).await?;
            if page.is_empty() {
                if let Err(e) = backend.clear_scroll(&scroll_id).await {
                    // Cursor will expire on its own after the keep-alive.
                    log::debug!("{descriptor}: failed to clear scroll cursor: {e}");
                }
                break;
            }
            fetched += page.len();
            cursor = page.scroll_id.clone().or(Some(scroll_id));
            sink.handle(descriptor, page).await;
        }
    }

    log::debug!("{descriptor}: fetched {fetched} documents");
    Ok(descriptor)
}
