//! Type-safe builder for `FanoutConfig` using the typestate pattern
//!
//! The backend URL and index name are required; the typestates make it
//! impossible to call `build()` before both are set. Everything else has
//! defaults matching the reference deployment.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use url::Url;

use super::types::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_DEAD_LETTER_CAPACITY, DEFAULT_MAX_DELIVERY_ATTEMPTS,
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEED_CONCURRENCY,
    DEFAULT_SORT_FIELD, DEFAULT_WORKER_COUNT, FanoutConfig, SCROLL_BATCH_SIZE, SCROLL_KEEP_ALIVE,
};

// Type states for the builder
pub struct WithBackendUrl;
pub struct Complete;

pub struct FanoutConfigBuilder<State = ()> {
    pub(crate) backend_url: Option<String>,
    pub(crate) index: Option<String>,
    pub(crate) page_size: u32,
    pub(crate) scroll_batch_size: u32,
    pub(crate) sort_field: String,
    pub(crate) scroll_keep_alive: String,
    pub(crate) worker_count: usize,
    pub(crate) channel_capacity: usize,
    pub(crate) max_delivery_attempts: u32,
    pub(crate) dead_letter_capacity: usize,
    pub(crate) request_timeout_secs: u64,
    pub(crate) scroll_to_exhaustion: bool,
    pub(crate) seed_concurrency: usize,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for FanoutConfigBuilder<()> {
    fn default() -> Self {
        Self {
            backend_url: None,
            index: None,
            page_size: DEFAULT_PAGE_SIZE,
            scroll_batch_size: SCROLL_BATCH_SIZE,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            scroll_keep_alive: SCROLL_KEEP_ALIVE.to_string(),
            worker_count: DEFAULT_WORKER_COUNT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_delivery_attempts: DEFAULT_MAX_DELIVERY_ATTEMPTS,
            dead_letter_capacity: DEFAULT_DEAD_LETTER_CAPACITY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            scroll_to_exhaustion: false,
            seed_concurrency: DEFAULT_SEED_CONCURRENCY,
            _phantom: PhantomData,
        }
    }
}

impl FanoutConfig {
    /// Create a builder for configuring a `FanoutConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> FanoutConfigBuilder<()> {
        FanoutConfigBuilder::default()
    }
}

impl<State> FanoutConfigBuilder<State> {
    fn transition<Next>(self) -> FanoutConfigBuilder<Next> {
        FanoutConfigBuilder {
            backend_url: self.backend_url,
            index: self.index,
            page_size: self.page_size,
            scroll_batch_size: self.scroll_batch_size,
            sort_field: self.sort_field,
            scroll_keep_alive: self.scroll_keep_alive,
            worker_count: self.worker_count,
            channel_capacity: self.channel_capacity,
            max_delivery_attempts: self.max_delivery_attempts,
            dead_letter_capacity: self.dead_letter_capacity,
            request_timeout_secs: self.request_timeout_secs,
            scroll_to_exhaustion: self.scroll_to_exhaustion,
            seed_concurrency: self.seed_concurrency,
            _phantom: PhantomData,
        }
    }

    /// Slicing page size; the slice count is `floor(total / page_size)`.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Documents fetched per scroll batch inside one slice.
    #[must_use]
    pub fn scroll_batch_size(mut self, size: u32) -> Self {
        self.scroll_batch_size = size;
        self
    }

    /// Field the slice scan sorts on, ascending.
    #[must_use]
    pub fn sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = field.into();
        self
    }

    /// Scroll cursor keep-alive window, backend syntax (e.g. `1m`).
    #[must_use]
    pub fn scroll_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll_keep_alive = keep_alive.into();
        self
    }

    /// Number of concurrent consumer tasks sharing the work channel.
    #[must_use]
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Bound of the in-process work channel.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Delivery attempts per descriptor before dead-lettering.
    #[must_use]
    pub fn max_delivery_attempts(mut self, attempts: u32) -> Self {
        self.max_delivery_attempts = attempts;
        self
    }

    /// Bound of the dead-letter channel.
    #[must_use]
    pub fn dead_letter_capacity(mut self, capacity: usize) -> Self {
        self.dead_letter_capacity = capacity;
        self
    }

    /// Timeout for every backend HTTP request, in seconds.
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Follow the scroll cursor past the first page of each slice.
    ///
    /// Defaults to false, preserving the reference single-page behavior.
    #[must_use]
    pub fn scroll_to_exhaustion(mut self, enabled: bool) -> Self {
        self.scroll_to_exhaustion = enabled;
        self
    }

    /// Concurrent insert bound for the seed generator.
    #[must_use]
    pub fn seed_concurrency(mut self, concurrency: usize) -> Self {
        self.seed_concurrency = concurrency;
        self
    }
}

impl FanoutConfigBuilder<()> {
    /// Base URL of the search backend (required).
    pub fn backend_url(mut self, url: impl Into<String>) -> FanoutConfigBuilder<WithBackendUrl> {
        self.backend_url = Some(url.into());
        self.transition()
    }
}

impl FanoutConfigBuilder<WithBackendUrl> {
    /// Target collection name (required).
    pub fn index(mut self, index: impl Into<String>) -> FanoutConfigBuilder<Complete> {
        self.index = Some(index.into());
        self.transition()
    }
}

impl FanoutConfigBuilder<Complete> {
    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL does not parse as http/https,
    /// the index name is empty, or any numeric bound is zero.
    pub fn build(self) -> Result<FanoutConfig> {
        let raw_url = self
            .backend_url
            .ok_or_else(|| anyhow!("backend_url is required"))?;
        let backend_url = Url::parse(&raw_url)
            .map_err(|e| anyhow!("invalid backend URL '{raw_url}': {e}"))?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "backend URL must be http or https, got '{}'",
                backend_url.scheme()
            ));
        }

        let index = self.index.ok_or_else(|| anyhow!("index is required"))?;
        if index.trim().is_empty() {
            return Err(anyhow!("index name must not be empty"));
        }

        if self.page_size == 0 {
            return Err(anyhow!("page_size must be greater than zero"));
        }
        if self.scroll_batch_size == 0 {
            return Err(anyhow!("scroll_batch_size must be greater than zero"));
        }
        if self.worker_count == 0 {
            return Err(anyhow!("worker_count must be at least 1"));
        }
        if self.channel_capacity == 0 || self.dead_letter_capacity == 0 {
            return Err(anyhow!("channel capacities must be at least 1"));
        }
        if self.max_delivery_attempts == 0 {
            return Err(anyhow!("max_delivery_attempts must be at least 1"));
        }

        Ok(FanoutConfig {
            backend_url,
            index,
            page_size: self.page_size,
            scroll_batch_size: self.scroll_batch_size,
            sort_field: self.sort_field,
            scroll_keep_alive: self.scroll_keep_alive,
            worker_count: self.worker_count,
            channel_capacity: self.channel_capacity,
            max_delivery_attempts: self.max_delivery_attempts,
            dead_letter_capacity: self.dead_letter_capacity,
            request_timeout_secs: self.request_timeout_secs,
            scroll_to_exhaustion: self.scroll_to_exhaustion,
            seed_concurrency: self.seed_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = FanoutConfig::builder()
            .backend_url("http://localhost:9200")
            .index("sample-records")
            .build()
            .unwrap();

        assert_eq!(config.page_size(), 500);
        assert_eq!(config.scroll_batch_size(), 10_000);
        assert_eq!(config.sort_field(), "timestamp");
        assert_eq!(config.scroll_keep_alive(), "1m");
        assert_eq!(config.max_delivery_attempts(), 3);
        assert!(!config.scroll_to_exhaustion());
    }

    #[test]
    fn rejects_zero_page_size() {
        let result = FanoutConfig::builder()
            .backend_url("http://localhost:9200")
            .index("sample-records")
            .page_size(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        let result = FanoutConfig::builder()
            .backend_url("ftp://localhost:21")
            .index("sample-records")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_index() {
        let result = FanoutConfig::builder()
            .backend_url("http://localhost:9200")
            .index("  ")
            .build();
        assert!(result.is_err());
    }
}
