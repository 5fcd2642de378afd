//! Search backend HTTP surface.
//!
//! The core consumes exactly two backend operations: a document count and a
//! sliced scroll search. Scroll continuation and single-document inserts are
//! carried for the optional scroll-to-exhaustion mode and the demo seed path.

pub mod client;
pub mod error;

pub use client::{SearchBackend, SlicePage};
pub use error::BackendError;
