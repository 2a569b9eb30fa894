//! Search backend layer.
//!
//! Translates typed requests into backend queries and backend responses into
//! typed records.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              PlaceService               │
//! └───────┬────────────┬────────────┬───────┘
//!         │            │            │
//!         ▼            ▼            ▼
//! ┌─────────────┐ ┌──────────┐ ┌──────────────┐
//! │    query    │ │ backend  │ │   response   │
//! │ (builders)  │ │ (trait)  │ │  (decoder)   │
//! └─────────────┘ └────┬─────┘ └──────────────┘
//!                      │
//!                      ▼
//!          ┌───────────────────────┐
//!          │ ElasticsearchBackend  │
//!          │     (reqwest)         │
//!          └───────────────────────┘
//! ```

mod backend;
mod elastic;
mod query;
mod response;

pub use backend::SearchBackend;
pub use elastic::{BasicCredentials, ElasticsearchBackend, DEFAULT_ES_URL, DEFAULT_INDEX};
pub use query::{
    build_geo_query, build_listing_query, DistanceType, DistanceUnit, GeoDistanceSort, GeoPoint,
    GeoQuery, GeoSort, ListingQuery, SearchQuery, SortMode, SortOrder, LATITUDE_RANGE,
    LONGITUDE_RANGE, RECOMMENDATION_LIMIT,
};
pub use response::{decode_envelope, decode_search_response, DecodedHits, TotalHits};
