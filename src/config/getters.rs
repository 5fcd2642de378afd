//! Getter methods for `FanoutConfig`
//!
//! Accessor methods for retrieving configuration values from a built
//! `FanoutConfig` instance.

use url::Url;

use super::types::FanoutConfig;

impl FanoutConfig {
    #[must_use]
    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn scroll_batch_size(&self) -> u32 {
        self.scroll_batch_size
    }

    #[must_use]
    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    #[must_use]
    pub fn scroll_keep_alive(&self) -> &str {
        &self.scroll_keep_alive
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    #[must_use]
    pub fn max_delivery_attempts(&self) -> u32 {
        self.max_delivery_attempts
    }

    #[must_use]
    pub fn dead_letter_capacity(&self) -> usize {
        self.dead_letter_capacity
    }

    #[must_use]
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    #[must_use]
    pub fn scroll_to_exhaustion(&self) -> bool {
        self.scroll_to_exhaustion
    }

    #[must_use]
    pub fn seed_concurrency(&self) -> usize {
        self.seed_concurrency
    }
}
