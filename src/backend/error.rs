//! Error taxonomy for search backend requests.

/// Failure modes of a single backend request.
///
/// The client never retries internally; retry policy belongs to the
/// delivery layer (per-slice work) or to the operator (count probe).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request could not complete at the transport level
    /// (connection refused, DNS, timeout).
    #[error("search backend unreachable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-success status.
    #[error("search backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the payload did not parse.
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
