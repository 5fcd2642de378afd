//! Fan-out configuration.
//!
//! `FanoutConfig` captures everything a run needs: the backend location,
//! slicing parameters, channel sizing, and the delivery retry budget.
//! Construction goes through a typestate builder so the two required
//! fields (backend URL and index name) are enforced at compile time.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, FanoutConfigBuilder, WithBackendUrl};
pub use types::FanoutConfig;
