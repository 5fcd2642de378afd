//! Asynchronous work channel decoupling the publisher from consumers.
//!
//! The channel carries opaque JSON message envelopes with at-least-once
//! delivery: a transiently failed message is re-enqueued with a bumped
//! attempt counter until the delivery budget runs out, at which point the
//! consumer routes it to the dead-letter path. The transport is an
//! in-process bounded mpsc; the envelope schema and attempt accounting are
//! broker-shaped so a real message broker can replace the transport at
//! this seam without touching the protocol.

pub mod errors;
pub mod message;
pub mod metrics;
pub mod queue;

pub use errors::ChannelError;
pub use message::{CONTENT_TYPE_JSON, WorkMessage};
pub use metrics::{ChannelMetrics, ChannelSnapshot};
pub use queue::{WorkChannel, WorkReceiver, work_channel};
