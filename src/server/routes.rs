//! Router configuration for the places API.
//!
//! This module defines the HTTP routes and applies middleware for authentication
//! and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /health                         - Health check (public)
//! /api/places?page=               - Paged listing (public)
//! /api/get_token                  - Issue an access token (public)
//! /api/recommend?lat=&lon=        - Nearest places (bearer token required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use places_api::places::PlaceService;
//! use places_api::search::ElasticsearchBackend;
//! use places_api::server::routes::{create_router, RouterConfig};
//!
//! let backend = ElasticsearchBackend::new("http://localhost:9200", "places")?;
//! let service = PlaceService::new(backend);
//!
//! let config = RouterConfig::new("my-secret-key")
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{bearer_auth_middleware, TokenAuthenticator};
use super::handlers::{
    health_handler, not_found_handler, places_handler, recommend_handler, token_handler, AppState,
};
use crate::places::PlaceService;
use crate::search::SearchBackend;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Issues tokens and verifies them on protected routes
    pub authenticator: TokenAuthenticator,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given auth secret.
    ///
    /// By default:
    /// - Tokens live for 1 hour
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(auth_secret: impl AsRef<[u8]>) -> Self {
        Self {
            authenticator: TokenAuthenticator::new(auth_secret),
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set the lifetime of issued tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.authenticator = self.authenticator.with_ttl(ttl);
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The bearer middleware is attached with `route_layer`, so it only runs for
/// requests that matched `/api/recommend`; unknown paths still get 404.
///
/// # Arguments
///
/// * `place_service` - The service answering listing and recommendation requests
/// * `config` - Router configuration
pub fn create_router<B>(place_service: PlaceService<B>, config: RouterConfig) -> Router
where
    B: SearchBackend + 'static,
{
    let cors = build_cors_layer(&config);
    let auth = config.authenticator.clone();
    let app_state = AppState::new(place_service, config.authenticator);

    let protected_routes = Router::new()
        .route("/api/recommend", get(recommend_handler::<B>))
        .route_layer(middleware::from_fn_with_state(auth, bearer_auth_middleware))
        .with_state(app_state.clone());

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api/places", get(places_handler::<B>))
        .route("/api/get_token", get(token_handler::<B>))
        .with_state(app_state);

    let router = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .fallback(not_found_handler)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
