//! Bounded work channel with at-least-once delivery accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify, mpsc};

use super::errors::ChannelError;
use super::message::WorkMessage;
use super::metrics::ChannelMetrics;

/// Create a bounded work channel.
///
/// Returns the send side (cloneable, also used by consumers for
/// redelivery) and the shared receive side. Every consumer task holds a
/// clone of the same `WorkReceiver`; each message is delivered to exactly
/// one of them.
#[must_use]
pub fn work_channel(capacity: usize, max_delivery_attempts: u32) -> (WorkChannel, WorkReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let channel = WorkChannel {
        tx,
        max_delivery_attempts,
        metrics: ChannelMetrics::new(),
        in_flight: Arc::new(AtomicUsize::new(0)),
        settled_notify: Arc::new(Notify::new()),
        shutdown: Arc::new(Notify::new()),
        shutdown_flag: Arc::new(AtomicBool::new(false)),
    };
    let receiver = WorkReceiver {
        rx: Arc::new(Mutex::new(rx)),
    };
    (channel, receiver)
}

/// Send side of the work channel.
///
/// Tracks in-flight messages so callers can wait for a run to settle:
/// a message counts as in flight from its first publish until a consumer
/// settles it (successful processing or dead-letter). Redelivery does not
/// change the in-flight count.
#[derive(Debug, Clone)]
pub struct WorkChannel {
    tx: mpsc::Sender<WorkMessage>,
    max_delivery_attempts: u32,
    metrics: ChannelMetrics,
    in_flight: Arc<AtomicUsize>,
    settled_notify: Arc<Notify>,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
}

impl WorkChannel {
    /// Publish a fresh message without blocking.
    ///
    /// Independent sends: one message failing to enqueue never affects
    /// another. A full channel surfaces as `ChannelError::Full` so the
    /// publisher can apply its own policy (the reference policy is log
    /// and continue).
    pub fn try_send(&self, message: WorkMessage) -> Result<(), ChannelError> {
        if self.is_shutdown() {
            self.metrics.increment_send_failures();
            return Err(ChannelError::Closed);
        }

        // Counted before enqueueing: the moment the send lands, a consumer
        // on another thread may already settle it.
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        match self.tx.try_send(message) {
            Ok(()) => {
                self.metrics.increment_published();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.settle();
                self.metrics.increment_send_failures();
                Err(ChannelError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.settle();
                self.metrics.increment_send_failures();
                Err(ChannelError::Closed)
            }
        }
    }

    /// Re-enqueue a message for another delivery attempt.
    ///
    /// Waits for capacity (the message is already in flight, so applying
    /// the channel's native backpressure here is safe).
    pub async fn redeliver(&self, message: WorkMessage) -> Result<(), ChannelError> {
        if self.is_shutdown() {
            return Err(ChannelError::Closed);
        }
        self.tx
            .send(message)
            .await
            .map_err(|_| ChannelError::Closed)?;
        self.metrics.increment_redelivered();
        Ok(())
    }

    /// Mark one in-flight message as terminally handled.
    ///
    /// Called by consumers exactly once per published message, after
    /// successful processing or after dead-lettering. `try_send` also
    /// settles internally when a send fails to enqueue.
    pub fn settle(&self) {
        let before = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(before > 0, "settle without matching send");
        if before == 1 {
            self.settled_notify.notify_waiters();
        }
    }

    /// Wait until every published message has settled.
    ///
    /// The notification is paired with a short timeout fallback so a
    /// missed wakeup cannot stall the wait.
    pub async fn drained(&self) {
        loop {
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            let _ = tokio::time::timeout(
                Duration::from_millis(5),
                self.settled_notify.notified(),
            )
            .await;
        }
    }

    /// Signal shutdown to all consumers.
    ///
    /// Idempotent; all clones of this channel share the same signal.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("work channel shutdown signaled");
    }

    /// Wait for the shutdown signal; consumers pair this with `recv` in
    /// a `tokio::select!` to exit their loops.
    ///
    /// Same timeout fallback as `drained`: a notification raced between
    /// the flag check and the wait is picked up on the next pass.
    pub async fn wait_for_shutdown(&self) {
        loop {
            if self.is_shutdown() {
                return;
            }
            let _ = tokio::time::timeout(Duration::from_millis(5), self.shutdown.notified()).await;
        }
    }

    /// Check whether shutdown has been signaled on any clone.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Messages published but not yet settled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Delivery attempts allowed per message before dead-lettering.
    #[must_use]
    pub fn max_delivery_attempts(&self) -> u32 {
        self.max_delivery_attempts
    }

    /// Delivery counters for this channel.
    #[must_use]
    pub fn metrics(&self) -> &ChannelMetrics {
        &self.metrics
    }
}

/// Shared receive side of the work channel.
///
/// Cloneable so an arbitrary worker pool can fan one logical subscription
/// out; the mutex serializes `recv` calls, not message processing.
#[derive(Debug, Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<WorkMessage>>>,
}

impl WorkReceiver {
    /// Receive the next message, or `None` once the channel is closed
    /// and fully drained.
    pub async fn recv(&self) -> Option<WorkMessage> {
        self.rx.lock().await.recv().await
    }
}
