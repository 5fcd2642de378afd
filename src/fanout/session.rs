//! Wiring for one fan-out deployment: backend client, work channel,
//! consumer pool, and dead-letter drain with explicit startup/shutdown.
//!
//! The session owns the shared resources the components borrow. No
//! singletons; everything is a dependency passed at construction.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::backend::SearchBackend;
use crate::channel::{ChannelSnapshot, WorkChannel, WorkReceiver, work_channel};
use crate::config::FanoutConfig;

use super::dead_letter::{DeadLetterEntry, DeadLetterSink};
use super::orchestrator::{FanoutError, FanoutReport, run_fanout};
use super::sink::SliceSink;
use super::worker::ConsumerPool;

/// A running fan-out deployment.
///
/// Consumers start immediately and idle on the channel; runs are triggered
/// on demand. One session can serve any number of runs before shutdown.
pub struct FanoutSession {
    config: Arc<FanoutConfig>,
    backend: Arc<SearchBackend>,
    channel: WorkChannel,
    pool: ConsumerPool,
    dead_letters: DeadLetterSink,
    dead_letter_drain: JoinHandle<()>,
}

impl FanoutSession {
    /// Construct the shared clients and start the consumer pool.
    ///
    /// # Errors
    /// Returns `FanoutError::Setup` if the backend HTTP client cannot be
    /// built.
    pub fn start(config: FanoutConfig, sink: Arc<dyn SliceSink>) -> Result<Self, FanoutError> {
        let config = Arc::new(config);
        let backend = Arc::new(SearchBackend::new(&config).map_err(FanoutError::Setup)?);

        let (channel, receiver): (WorkChannel, WorkReceiver) =
            work_channel(config.channel_capacity(), config.max_delivery_attempts());
        let (dead_letters, dead_letter_drain) =
            DeadLetterSink::start(config.dead_letter_capacity());

        let pool = ConsumerPool::start(
            Arc::clone(&config),
            Arc::clone(&backend),
            channel.clone(),
            receiver,
            sink,
            dead_letters.clone(),
        );

        log::info!(
            "fan-out session started: index {}, {} workers, channel capacity {}",
            config.index(),
            config.worker_count(),
            config.channel_capacity(),
        );

        Ok(Self {
            config,
            backend,
            channel,
            pool,
            dead_letters,
            dead_letter_drain,
        })
    }

    /// Trigger one fan-out run with the configured page size.
    pub async fn trigger(&self) -> Result<FanoutReport, FanoutError> {
        run_fanout(&self.backend, &self.channel, self.config.page_size()).await
    }

    /// Wait until every published descriptor has settled (processed or
    /// dead-lettered).
    pub async fn drain(&self) {
        self.channel.drained().await;
    }

    /// Dead-letter entries recorded so far.
    #[must_use]
    pub fn dead_letters(&self) -> Vec<DeadLetterEntry> {
        self.dead_letters.entries()
    }

    /// Current delivery counters.
    #[must_use]
    pub fn metrics(&self) -> ChannelSnapshot {
        self.channel.metrics().snapshot()
    }

    /// Shared backend client (also used by the seed path).
    #[must_use]
    pub fn backend(&self) -> &Arc<SearchBackend> {
        &self.backend
    }

    /// The outbound work channel, for publishing raw messages directly.
    #[must_use]
    pub fn channel(&self) -> &WorkChannel {
        &self.channel
    }

    /// Stop the consumer pool and the dead-letter drain.
    ///
    /// Does not wait for in-flight work; call `drain()` first for a clean
    /// end of run. Returns the final dead-letter ledger.
    pub async fn shutdown(self) -> Vec<DeadLetterEntry> {
        let Self {
            channel,
            pool,
            dead_letters,
            dead_letter_drain,
            ..
        } = self;

        channel.shutdown();
        pool.join().await;

        let entries = dead_letters.entries();
        // Last sink clone; dropping it ends the drain task.
        drop(dead_letters);
        if let Err(e) = dead_letter_drain.await {
            log::error!("dead-letter drain panicked: {e}");
        }

        log::info!("fan-out session stopped");
        entries
    }
}
