//! # Places API
//!
//! An HTTP API over a place catalog stored in Elasticsearch.
//!
//! This library translates typed requests (a page number, a coordinate) into
//! backend search queries, decodes the backend's result envelope into typed
//! records with pagination metadata, and issues and verifies the short-lived
//! bearer tokens that gate the recommendation endpoint.
//!
//! ## Features
//!
//! - **Paged listing**: fixed-size, 1-based pages with total and last-page metadata
//! - **Recommendations**: the three places nearest to a coordinate
//! - **Authentication**: HMAC-SHA256 signed bearer tokens (compact JWT, HS256)
//! - **Pluggable backend**: handlers are generic over [`SearchBackend`]
//!
//! ## Architecture
//!
//! - [`search`] - Query builders, response decoder and the Elasticsearch client
//! - [`places`] - Place service and pagination
//! - [`server`] - Axum-based HTTP server, routes and token authentication
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use places_api::{create_router, ElasticsearchBackend, PlaceService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = ElasticsearchBackend::new("http://localhost:9200", "places").unwrap();
//!     let service = PlaceService::new(backend);
//!     let router = create_router(service, RouterConfig::new("a-long-random-secret"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod places;
pub mod search;
pub mod server;

// Re-export commonly used types
pub use config::{
    BackendArgs, CheckConfig, Cli, Command, SecretString, ServeConfig, TokenConfig,
    TokenOutputFormat,
};
pub use error::{BackendError, DecodeError, PlaceError, ValidationError};
pub use places::{
    last_page, PagedResult, Paginator, Place, PlaceService, DEFAULT_MAX_RESULT_WINDOW,
    DEFAULT_PAGE_SIZE,
};
pub use search::{
    build_geo_query, build_listing_query, decode_search_response, ElasticsearchBackend, GeoPoint,
    SearchBackend, SearchQuery, TotalHits,
};
pub use server::{
    authorize_bearer, bearer_auth_middleware, create_router, AppState, AuthError, ErrorResponse,
    RouterConfig, TokenAuthenticator, TokenClaims,
};
