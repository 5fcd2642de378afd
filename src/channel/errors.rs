//! Error types for work channel operations.

/// Error types for work channel operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel was shut down or every receiver is gone.
    #[error("work channel closed")]
    Closed,

    /// The channel is at capacity and the send was non-blocking.
    #[error("work channel full (capacity exceeded)")]
    Full,
}
