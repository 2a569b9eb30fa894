use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BackendError;

use super::query::SearchQuery;

/// Trait for executing queries against the search backend.
///
/// This abstraction lets the place service run against Elasticsearch in
/// production and an in-memory fake in tests. Implementations must be
/// thread-safe; a single instance is shared by all requests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute `query` and return the raw response body.
    ///
    /// Called once per request with no retry. A transport failure or a
    /// non-success status is returned as [`BackendError`]; the body is not
    /// inspected here.
    async fn search(&self, query: &SearchQuery) -> Result<Bytes, BackendError>;

    /// A name for this backend (for logging).
    ///
    /// For Elasticsearch this is `{url}/{index}`.
    fn identifier(&self) -> &str;
}
