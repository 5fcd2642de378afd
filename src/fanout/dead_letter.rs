//! Terminal path for work that could not be processed.
//!
//! Descriptors arrive here after exhausting their delivery budget or after
//! being classified as poison messages. Each entry is appended to an
//! inspectable ledger and forwarded to the dead-letter channel, whose
//! drain task writes the structured log record an operator inspects.
//! Entries are terminal: nothing re-publishes from here automatically.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel::WorkMessage;
use crate::protocol::WorkDescriptor;

/// One dead-lettered work item with its failure context.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterEntry {
    /// The descriptor, when the payload decoded as one.
    pub descriptor: Option<WorkDescriptor>,
    /// Original message payload, verbatim.
    pub payload: String,
    /// Why the item was dead-lettered.
    pub cause: String,
    /// Delivery attempts consumed before giving up.
    pub attempts: u32,
    pub recorded_at: DateTime<Utc>,
}

impl DeadLetterEntry {
    /// Build an entry from the failed message and its terminal cause.
    ///
    /// The payload is re-decoded on a best-effort basis so the ledger
    /// shows the descriptor even when the failure happened downstream of
    /// decoding.
    #[must_use]
    pub fn from_message(message: &WorkMessage, cause: String) -> Self {
        Self {
            descriptor: serde_json::from_slice(&message.body).ok(),
            payload: message.body_text(),
            cause,
            attempts: message.attempt,
            recorded_at: Utc::now(),
        }
    }
}

/// Recorder and drain of the dead-letter channel.
///
/// Cloneable; all clones share one ledger and one channel. The ledger is
/// appended synchronously in `record`, so `entries()` is consistent the
/// moment a worker has settled its message.
#[derive(Debug, Clone)]
pub struct DeadLetterSink {
    tx: mpsc::Sender<DeadLetterEntry>,
    ledger: Arc<Mutex<Vec<DeadLetterEntry>>>,
}

impl DeadLetterSink {
    /// Create the sink and spawn its drain task.
    ///
    /// The drain task logs every entry at error level and exits once all
    /// sink clones are dropped.
    #[must_use]
    pub fn start(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<DeadLetterEntry>(capacity);
        let ledger = Arc::new(Mutex::new(Vec::new()));

        let drain = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                match serde_json::to_string(&entry) {
                    Ok(json) => log::error!("dead letter: {json}"),
                    Err(_) => log::error!(
                        "dead letter: payload {} (cause: {})",
                        entry.payload,
                        entry.cause
                    ),
                }
            }
            log::debug!("dead-letter drain exiting");
        });

        (Self { tx, ledger }, drain)
    }

    /// Record a terminally failed work item.
    pub async fn record(&self, entry: DeadLetterEntry) {
        self.ledger.lock().push(entry.clone());
        if let Err(send_err) = self.tx.send(entry).await {
            // Drain task already gone; the ledger still has the record.
            let entry = send_err.0;
            log::error!(
                "dead letter (channel closed): payload {} (cause: {})",
                entry.payload,
                entry.cause
            );
        }
    }

    /// Snapshot of every entry recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<DeadLetterEntry> {
        self.ledger.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ledger.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledger.lock().is_empty()
    }
}
