//! Delivery metrics for the work channel using lock-free atomic operations.
//!
//! All counters use `Ordering::SeqCst` for sequential consistency,
//! ensuring snapshot reads are coherent across all fields.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking the life of messages on the work channel.
#[derive(Debug, Clone)]
pub struct ChannelMetrics {
    pub messages_published: Arc<AtomicU64>,
    pub messages_delivered: Arc<AtomicU64>,
    pub messages_redelivered: Arc<AtomicU64>,
    pub messages_dead_lettered: Arc<AtomicU64>,
    pub send_failures: Arc<AtomicU64>,
}

impl ChannelMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages_published: Arc::new(AtomicU64::new(0)),
            messages_delivered: Arc::new(AtomicU64::new(0)),
            messages_redelivered: Arc::new(AtomicU64::new(0)),
            messages_dead_lettered: Arc::new(AtomicU64::new(0)),
            send_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn increment_published(&self) {
        self.messages_published.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_redelivered(&self) {
        self.messages_redelivered.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_dead_lettered(&self) {
        self.messages_dead_lettered.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Consistent view across all counters.
    #[must_use]
    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            messages_published: self.messages_published.load(Ordering::SeqCst),
            messages_delivered: self.messages_delivered.load(Ordering::SeqCst),
            messages_redelivered: self.messages_redelivered.load(Ordering::SeqCst),
            messages_dead_lettered: self.messages_dead_lettered.load(Ordering::SeqCst),
            send_failures: self.send_failures.load(Ordering::SeqCst),
        }
    }

}

impl Default for ChannelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the channel counters.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSnapshot {
    pub messages_published: u64,
    pub messages_delivered: u64,
    pub messages_redelivered: u64,
    pub messages_dead_lettered: u64,
    pub send_failures: u64,
}

impl ChannelSnapshot {
    /// Messages that reached a terminal state (delivered or dead-lettered).
    #[must_use]
    pub fn settled(&self) -> u64 {
        self.messages_delivered + self.messages_dead_lettered
    }

    /// Fraction of published messages that were ultimately delivered.
    #[must_use]
    pub fn delivery_rate(&self) -> f64 {
        if self.messages_published == 0 {
            return 1.0;
        }
        self.messages_delivered as f64 / self.messages_published as f64
    }
}
