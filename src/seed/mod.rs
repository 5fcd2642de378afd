//! Demo-data generator for the target index.
//!
//! Out of the core slicing protocol: only the timestamp field matters to
//! the fan-out, as the slice scan's sort key. Inserts are independent
//! writes with no shared mutable state, parallelized under a bounded
//! semaphore; individual failures are logged and counted, never fatal.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::backend::SearchBackend;

/// One generated document: an opaque unique identifier plus the timestamp
/// the slice scan sorts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub uuid: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl SampleRecord {
    #[must_use]
    pub fn random() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of one seeding pass.
#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub requested: usize,
    pub indexed: usize,
    pub failed: usize,
}

/// Insert `count` random records into the target index.
///
/// At most `concurrency` inserts are in flight at once.
pub async fn seed_index(backend: &SearchBackend, count: usize, concurrency: usize) -> SeedReport {
    log::info!("seeding {count} documents into {}", backend.index());
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let inserts = (0..count).map(|i| {
        let backend = backend.clone();
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return false,
            };
            match backend.index_document(&SampleRecord::random()).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("seed insert {i} failed: {e}");
                    false
                }
            }
        }
    });

    let results = join_all(inserts).await;
    let indexed = results.into_iter().filter(|ok| *ok).count();
    let report = SeedReport {
        requested: count,
        indexed,
        failed: count - indexed,
    };
    log::info!(
        "seeded {}/{} documents ({} failed)",
        report.indexed,
        report.requested,
        report.failed,
    );
    report
}
