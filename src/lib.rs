//! slicefan — fan large search result sets out into parallel sliced
//! scroll queries coordinated over an async work channel.
//!
//! A run probes the backend's document count, derives
//! `floor(total / page_size)` slices, and publishes one work descriptor
//! per slice. Independent consumers execute each slice as a backend-native
//! sliced scroll search; transiently failed deliveries are retried and
//! everything else lands in an inspectable dead-letter path.

pub mod backend;
pub mod channel;
pub mod config;
pub mod fanout;
pub mod protocol;
pub mod seed;

pub use backend::{BackendError, SearchBackend, SlicePage};
pub use channel::{
    CONTENT_TYPE_JSON, ChannelError, ChannelMetrics, ChannelSnapshot, WorkChannel, WorkMessage,
    WorkReceiver, work_channel,
};
pub use config::FanoutConfig;
pub use fanout::{
    CollectSink, ConsumerPool, DeadLetterEntry, DeadLetterSink, FanoutError, FanoutReport,
    FanoutSession, LogSink, PublishOutcome, SliceSink, WorkFailure, publish_descriptors,
    run_fanout,
};
pub use protocol::{DocumentCount, WorkDescriptor, compute_slices};
pub use seed::{SampleRecord, SeedReport, seed_index};

use std::sync::Arc;

/// One-shot convenience: start a session with the reference log-and-discard
/// sink, trigger a single run, wait for every slice to settle, and stop.
pub async fn fan_out(config: FanoutConfig) -> Result<FanoutReport, FanoutError> {
    let session = FanoutSession::start(config, Arc::new(LogSink))?;
    let report = match session.trigger().await {
        Ok(report) => report,
        Err(e) => {
            session.shutdown().await;
            return Err(e);
        }
    };
    session.drain().await;
    session.shutdown().await;
    Ok(report)
}
