//! Test utilities for integration tests.
//!
//! This module provides an in-memory search backend and helpers for building
//! backend result envelopes and HTTP requests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use places_api::error::BackendError;
use places_api::search::{SearchBackend, SearchQuery};

// =============================================================================
// Mock Search Backend
// =============================================================================

/// A canned backend answer.
#[derive(Clone)]
pub enum MockReply {
    Body(Bytes),
    Fail(BackendError),
}

/// An in-memory backend that answers listing and geo queries with canned
/// replies and records every query it receives.
///
/// Clones share the recorded queries, so a test can keep one clone while the
/// router owns another.
#[derive(Clone)]
pub struct MockSearchBackend {
    listing: MockReply,
    geo: MockReply,
    request_count: Arc<AtomicUsize>,
    queries: Arc<RwLock<Vec<SearchQuery>>>,
}

impl MockSearchBackend {
    /// A backend holding an empty catalog.
    pub fn new() -> Self {
        Self {
            listing: MockReply::Body(to_bytes(&envelope(Some(0), &[]))),
            geo: MockReply::Body(to_bytes(&envelope(None, &[]))),
            request_count: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_listing(mut self, response: Value) -> Self {
        self.listing = MockReply::Body(to_bytes(&response));
        self
    }

    pub fn with_geo(mut self, response: Value) -> Self {
        self.geo = MockReply::Body(to_bytes(&response));
        self
    }

    /// Answer every query with a raw body, JSON or not.
    pub fn with_raw_body(mut self, body: &'static [u8]) -> Self {
        self.listing = MockReply::Body(Bytes::from_static(body));
        self.geo = MockReply::Body(Bytes::from_static(body));
        self
    }

    /// Fail every query with `err`.
    pub fn failing(mut self, err: BackendError) -> Self {
        self.listing = MockReply::Fail(err.clone());
        self.geo = MockReply::Fail(err);
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn queries(&self) -> Vec<SearchQuery> {
        self.queries.read().await.clone()
    }
}

impl Default for MockSearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Bytes, BackendError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.queries.write().await.push(*query);

        let reply = match query {
            SearchQuery::Listing(_) => &self.listing,
            SearchQuery::Geo(_) => &self.geo,
        };
        match reply {
            MockReply::Body(body) => Ok(body.clone()),
            MockReply::Fail(err) => Err(err.clone()),
        }
    }

    fn identifier(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Envelope Helpers
// =============================================================================

/// A catalog document as stored in the index.
pub fn place_doc(name: &str) -> Value {
    json!({
        "id": name,
        "name": name,
        "address": format!("{} street", name),
        "phone": "(499) 000-00-00",
        "location": {"lon": 37.6, "lat": 55.7}
    })
}

/// Build a search result envelope. `total` of `None` omits the total, as
/// the backend does when totals are not tracked.
pub fn envelope(total: Option<u64>, sources: &[Value]) -> Value {
    let hits: Vec<Value> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| json!({"_index": "places", "_id": i.to_string(), "_source": source}))
        .collect();

    let mut hits_obj = json!({"hits": hits});
    if let Some(total) = total {
        hits_obj["total"] = json!({"value": total, "relation": "eq"});
    }

    json!({"took": 1, "timed_out": false, "hits": hits_obj})
}

/// An envelope holding named places.
pub fn named_envelope(total: Option<u64>, names: &[&str]) -> Value {
    let docs: Vec<Value> = names.iter().map(|n| place_doc(n)).collect();
    envelope(total, &docs)
}

fn to_bytes(value: &Value) -> Bytes {
    Bytes::from(serde_json::to_vec(value).unwrap())
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Build a GET request, optionally with an `Authorization` header.
pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
