//! Elasticsearch-backed search backend.
//!
//! Sends queries to `POST {base_url}/{index}/_search` over HTTP using
//! reqwest. The client is created once and cloned cheaply; reqwest pools
//! connections internally.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::BackendError;

use super::backend::SearchBackend;
use super::query::SearchQuery;

/// Default backend URL.
pub const DEFAULT_ES_URL: &str = "http://localhost:9200";

/// Default index holding the place catalog.
pub const DEFAULT_INDEX: &str = "places";

/// Basic-auth credentials for the backend.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Elasticsearch implementation of [`SearchBackend`].
///
/// # Example
///
/// ```ignore
/// use places_api::search::ElasticsearchBackend;
///
/// let backend = ElasticsearchBackend::new("http://localhost:9200", "places")?
///     .with_timeout(std::time::Duration::from_secs(5));
/// let count = backend.count_documents().await?;
/// ```
#[derive(Clone, Debug)]
pub struct ElasticsearchBackend {
    client: Client,
    base_url: Url,
    index: String,
    credentials: Option<BasicCredentials>,
    timeout: Option<Duration>,
    identifier: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl ElasticsearchBackend {
    /// Create a backend for `index` at `base_url`.
    ///
    /// Returns an error message if the URL cannot be parsed or the index name
    /// is empty.
    pub fn new(base_url: &str, index: impl Into<String>) -> Result<Self, String> {
        Self::with_client(Client::new(), base_url, index)
    }

    /// Create a backend using an existing reqwest client.
    pub fn with_client(
        client: Client,
        base_url: &str,
        index: impl Into<String>,
    ) -> Result<Self, String> {
        let index = index.into();
        if index.is_empty() {
            return Err("index name must not be empty".to_string());
        }

        let mut base_url = Url::parse(base_url)
            .map_err(|e| format!("invalid backend URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(format!("invalid backend URL '{}'", base_url));
        }

        // Url::join replaces the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let identifier = format!("{}{}", base_url, index);

        Ok(Self {
            client,
            base_url,
            index,
            credentials: None,
            timeout: None,
            identifier,
        })
    }

    /// Authenticate with HTTP basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.credentials = Some(BasicCredentials {
            username: username.into(),
            password,
        });
        self
    }

    /// Abort backend calls that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Get the `_search` endpoint URL, including the total-hits flag.
    pub fn search_url(&self, track_total_hits: bool) -> Result<Url, BackendError> {
        let mut url = self.endpoint("_search")?;
        url.query_pairs_mut()
            .append_pair("track_total_hits", if track_total_hits { "true" } else { "false" });
        Ok(url)
    }

    /// Count the documents in the index.
    pub async fn count_documents(&self) -> Result<u64, BackendError> {
        let url = self.endpoint("_count")?;
        let response = self.send(self.client.get(url)).await?;

        let parsed: CountResponse = serde_json::from_slice(&response)
            .map_err(|e| BackendError::InvalidResponse(format!("_count: {}", e)))?;
        Ok(parsed.count)
    }

    fn endpoint(&self, action: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("{}/{}", self.index, action))
            .map_err(|e| BackendError::Connection(format!("invalid endpoint URL: {}", e)))
    }

    /// Apply auth and timeout, send, and check the status code.
    async fn send(&self, mut request: RequestBuilder) -> Result<Bytes, BackendError> {
        if let Some(ref credentials) = self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(BackendError::from_transport)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::IndexNotFound(self.index.clone()));
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        response.bytes().await.map_err(BackendError::from_transport)
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Bytes, BackendError> {
        let url = self.search_url(query.track_total_hits())?;
        debug!(
            backend = %self.identifier,
            query = %serde_json::to_string(query).unwrap_or_default(),
            "Sending search request"
        );

        self.send(self.client.post(url).json(query)).await
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
