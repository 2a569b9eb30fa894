//! HTTP server layer for the places API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │  /api/places   /api/recommend   /api/get_token   /health        │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (bearer JWT)│  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{
    authorize_bearer, bearer_auth_middleware, AuthError, TokenAuthenticator, TokenClaims,
    DEFAULT_ISSUER, DEFAULT_TOKEN_TTL,
};
pub use handlers::{
    health_handler, places_handler, recommend_handler, token_handler, AppState, ErrorResponse,
    HealthResponse, PlacesQueryParams, RecommendQueryParams, RecommendationResponse, TokenResponse,
};
pub use routes::{create_router, RouterConfig};
