//! HTTP client for the search backend.
//!
//! Thin wrapper over `reqwest` exposing the operations the fan-out core
//! needs: `_count`, sliced `_search?scroll=…`, scroll continuation and
//! cleanup, and `_doc` inserts for the seed path. The underlying client is
//! connection-pooled and cheap to clone, so one `SearchBackend` is shared
//! read-only across the count probe and every concurrent worker.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::error::BackendError;
use crate::config::FanoutConfig;
use crate::protocol::{DocumentCount, WorkDescriptor};

/// One page of a sliced scroll search.
///
/// Documents are kept opaque (`serde_json::Value`); the core only routes
/// them to a sink, it never interprets them.
#[derive(Debug, Clone)]
pub struct SlicePage {
    /// Cursor for scroll continuation, when the backend returned one.
    pub scroll_id: Option<String>,
    /// Raw document hits for this page.
    pub documents: Vec<serde_json::Value>,
}

impl SlicePage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Deserialize)]
struct CountResponse {
    count: DocumentCount,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Deserialize, Default)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<serde_json::Value>,
}

impl From<SearchResponse> for SlicePage {
    fn from(resp: SearchResponse) -> Self {
        Self {
            scroll_id: resp.scroll_id,
            documents: resp.hits.hits,
        }
    }
}

/// Shared client for the target search collection.
#[derive(Debug, Clone)]
pub struct SearchBackend {
    http: reqwest::Client,
    base: Url,
    index: String,
    scroll_keep_alive: String,
}

impl SearchBackend {
    /// Build a backend client from the fan-out configuration.
    ///
    /// # Errors
    /// Returns `BackendError::Unavailable` if the HTTP client cannot be
    /// constructed (TLS backend initialization).
    pub fn new(config: &FanoutConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        // Normalize so Url::join treats the base as a directory.
        let mut base = config.backend_url().clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            index: config.index().to_string(),
            scroll_keep_alive: config.scroll_keep_alive().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Unavailable(format!("invalid endpoint {path}: {e}")))
    }

    /// Total number of documents currently matching the target index.
    ///
    /// Single synchronous request, no retries; the caller owns retry policy.
    pub async fn count(&self) -> Result<DocumentCount, BackendError> {
        let url = self.endpoint(&format!("{}/_count", self.index))?;
        let response = self.http.get(url).send().await?;

        let parsed: CountResponse = decode(response).await?;
        log::debug!("count probe: {} documents in {}", parsed.count, self.index);
        Ok(parsed.count)
    }

    /// Execute the sliced scroll search for one work descriptor.
    ///
    /// The request body follows the backend's native slicing contract:
    /// `{"slice":{"id":…,"max":…},"size":…,"sort":[{<field>:"asc"}]}`.
    /// Only the first page is returned; continuation is the caller's choice.
    pub async fn sliced_scroll(
        &self,
        slice: WorkDescriptor,
        batch_size: u32,
        sort_field: &str,
    ) -> Result<SlicePage, BackendError> {
        let url = self.endpoint(&format!("{}/_search", self.index))?;

        let mut sort_key = serde_json::Map::new();
        sort_key.insert(sort_field.to_string(), serde_json::Value::from("asc"));
        let body = json!({
            "slice": { "id": slice.id, "max": slice.max },
            "size": batch_size,
            "sort": [sort_key],
        });

        let response = self
            .http
            .request(Method::GET, url)
            .query(&[("scroll", self.scroll_keep_alive.as_str())])
            .json(&body)
            .send()
            .await?;

        let parsed: SearchResponse = decode(response).await?;
        Ok(parsed.into())
    }

    /// Fetch the next page of an open scroll cursor.
    pub async fn continue_scroll(&self, scroll_id: &str) -> Result<SlicePage, BackendError> {
        let url = self.endpoint("_search/scroll")?;
        let body = json!({
            "scroll": self.scroll_keep_alive,
            "scroll_id": scroll_id,
        });

        let response = self.http.post(url).json(&body).send().await?;
        let parsed: SearchResponse = decode(response).await?;
        Ok(parsed.into())
    }

    /// Release an open scroll cursor.
    ///
    /// Cursors expire on their own after the keep-alive window; callers
    /// treat failures here as non-fatal.
    pub async fn clear_scroll(&self, scroll_id: &str) -> Result<(), BackendError> {
        let url = self.endpoint("_search/scroll")?;
        let body = json!({ "scroll_id": [scroll_id] });

        let response = self.http.delete(url).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Insert one document into the target index (seed path only).
    pub async fn index_document<T: Serialize>(&self, document: &T) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("{}/_doc", self.index))?;
        let response = self.http.post(url).json(document).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Name of the target index, as configured.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}
