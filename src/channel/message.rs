//! Message envelope carried on the work channels.

/// Content-type marker attached to every published work message.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One message on the work channel: a raw payload plus delivery metadata.
///
/// The payload stays opaque bytes at this layer; decoding happens at the
/// consumer so that undecodable bodies can be classified as poison
/// messages rather than failing the transport.
#[derive(Debug, Clone)]
pub struct WorkMessage {
    /// Serialized message body.
    pub body: Vec<u8>,
    /// Content-type marker, `application/json` for all published work.
    pub content_type: &'static str,
    /// 1-based delivery attempt. Attempt 1 is the initial publish.
    pub attempt: u32,
}

impl WorkMessage {
    /// Wrap a JSON payload as a first-attempt message.
    #[must_use]
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: CONTENT_TYPE_JSON,
            attempt: 1,
        }
    }

    /// The same message, marked for its next delivery attempt.
    #[must_use]
    pub fn next_attempt(mut self) -> Self {
        self.attempt += 1;
        self
    }

    /// Payload rendered as text for logging and dead-letter records.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
