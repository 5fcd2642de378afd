//! Fan-out pipeline: publish, consume, dead-letter, orchestrate.
//!
//! One run flows count → slice computation → publish; each published
//! descriptor is then processed independently by the consumer pool. Slice
//! failures are isolated by construction: a descriptor that exhausts its
//! delivery budget lands in the dead-letter path without touching its
//! siblings.

// Sub-modules
pub mod dead_letter;
pub mod orchestrator;
pub mod publisher;
pub mod session;
pub mod sink;
pub mod worker;

// Re-exports for public API
pub use dead_letter::{DeadLetterEntry, DeadLetterSink};
pub use orchestrator::{FanoutError, FanoutReport, run_fanout};
pub use publisher::{PublishOutcome, publish_descriptors};
pub use session::FanoutSession;
pub use sink::{CollectSink, LogSink, SliceSink};
pub use worker::{ConsumerPool, WorkFailure};
