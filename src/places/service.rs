//! Place Service for answering listing and recommendation requests.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         PlaceService                          │
//! │                                                               │
//! │  list_places(page)              recommend(point)              │
//! │   1. offset for page             1. validate coordinates      │
//! │   2. past the result window?     2. geo query (3 nearest)     │
//! │      count first, check page     3. backend search            │
//! │   3. listing query               4. decode (total ignored)    │
//! │   4. backend search                                           │
//! │   5. decode (total required)                                  │
//! │   6. paginate                                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::error::PlaceError;
use crate::search::{
    build_geo_query, build_listing_query, decode_search_response, GeoPoint, SearchBackend,
    SearchQuery, TotalHits,
};

use super::model::{PagedResult, Place};
use super::paginator::Paginator;

/// Service mediating between HTTP handlers and the search backend.
///
/// The backend is injected at construction; the service holds no other
/// state and can be shared across requests.
///
/// # Example
///
/// ```ignore
/// use places_api::places::PlaceService;
/// use places_api::search::{ElasticsearchBackend, GeoPoint};
///
/// let backend = ElasticsearchBackend::new("http://localhost:9200", "places")?;
/// let service = PlaceService::new(backend);
///
/// let page = service.list_places(1).await?;
/// let nearest = service.recommend(GeoPoint::new(55.674, 37.666)).await?;
/// ```
pub struct PlaceService<B: SearchBackend> {
    backend: Arc<B>,
    paginator: Paginator,
}

impl<B: SearchBackend> PlaceService<B> {
    /// Create a service with the default page size (10).
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    /// Create a service over a shared backend.
    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            paginator: Paginator::default(),
        }
    }

    /// Set the number of places per page.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.paginator =
            Paginator::new(page_size).with_max_result_window(self.paginator.max_result_window());
        self
    }

    /// Set the deepest `from + size` the backend serves.
    pub fn with_max_result_window(mut self, max_result_window: u64) -> Self {
        self.paginator = self.paginator.with_max_result_window(max_result_window);
        self
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn page_size(&self) -> u64 {
        self.paginator.page_size()
    }

    /// Fetch one page of the catalog.
    ///
    /// Pages below 1 are rejected without querying the backend. Pages past
    /// the end are rejected once the backend has reported the total. A page
    /// beyond the result window is only fetched after a zero-size query has
    /// shown it to be in range.
    pub async fn list_places(&self, page: i64) -> Result<PagedResult<Place>, PlaceError> {
        let offset = self.paginator.offset_for(page)?;
        if !self.paginator.fits_window(offset) {
            let total = self.count_places().await?;
            self.paginator.check_page(total, page)?;
            debug!(
                backend = self.backend.identifier(),
                page,
                offset,
                window = self.paginator.max_result_window(),
                "Fetching page past the result window"
            );
        }

        let query = build_listing_query(self.paginator.page_size(), offset);

        let body = self.backend.search(&SearchQuery::Listing(query)).await?;
        let decoded = decode_search_response::<Place>(&body, TotalHits::Required)?;

        // decode enforces presence when the total is required
        let total = decoded.total.unwrap_or_default();

        debug!(
            backend = self.backend.identifier(),
            page,
            total,
            items = decoded.items.len(),
            "Listing page fetched"
        );

        Ok(self.paginator.paginate(decoded.items, total, page)?)
    }

    /// Catalog size from a query that returns no hits.
    async fn count_places(&self) -> Result<u64, PlaceError> {
        let query = build_listing_query(0, 0);
        let body = self.backend.search(&SearchQuery::Listing(query)).await?;
        let decoded = decode_search_response::<Place>(&body, TotalHits::Required)?;
        Ok(decoded.total.unwrap_or_default())
    }

    /// Fetch the places nearest to `point`, closest first.
    ///
    /// Returns at most three places; fewer when the catalog is smaller or
    /// some hits fail to decode.
    pub async fn recommend(&self, point: GeoPoint) -> Result<Vec<Place>, PlaceError> {
        point.validate()?;

        let query = build_geo_query(point);
        let body = self.backend.search(&SearchQuery::Geo(query)).await?;
        let decoded = decode_search_response::<Place>(&body, TotalHits::Ignored)?;

        debug!(
            backend = self.backend.identifier(),
            lat = point.latitude,
            lon = point.longitude,
            items = decoded.items.len(),
            "Recommendations fetched"
        );

        Ok(decoded.items)
    }
}

// =============================================================================
// Tests
// =============================================================================
