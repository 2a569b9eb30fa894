//! HTTP request handlers for the places API.
//!
//! # Endpoints
//!
//! - `GET /api/places?page={n}` - One page of the catalog
//! - `GET /api/recommend?lat={lat}&lon={lon}` - Three nearest places (bearer token required)
//! - `GET /api/get_token` - Issue an access token
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use url::form_urlencoded;

use crate::error::{BackendError, DecodeError, PlaceError, ValidationError};
use crate::places::{PagedResult, Place, PlaceService};
use crate::search::{GeoPoint, SearchBackend};

use super::auth::{AuthError, TokenAuthenticator};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<B: SearchBackend> {
    /// The place service answering listing and recommendation requests
    pub place_service: Arc<PlaceService<B>>,

    /// Issues tokens for `/api/get_token`
    pub authenticator: TokenAuthenticator,
}

impl<B: SearchBackend> AppState<B> {
    /// Create a new application state.
    pub fn new(place_service: PlaceService<B>, authenticator: TokenAuthenticator) -> Self {
        Self {
            place_service: Arc::new(place_service),
            authenticator,
        }
    }
}

impl<B: SearchBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            place_service: Arc::clone(&self.place_service),
            authenticator: self.authenticator.clone(),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for the listing endpoint.
///
/// Read from the raw query string so that malformed or repeated parameters
/// produce our own 400 body rather than the extractor's plain-text rejection.
/// The first occurrence of a repeated parameter wins.
#[derive(Debug, Default)]
pub struct PlacesQueryParams {
    /// 1-based page number
    pub page: Option<String>,
}

impl PlacesQueryParams {
    pub fn from_query(query: Option<&str>) -> Self {
        Self {
            page: query_value(query, "page"),
        }
    }

    /// Parse the page number.
    pub fn page(&self) -> Result<i64, ValidationError> {
        let raw = required("page", self.page.as_deref())?;
        raw.parse().map_err(|_| ValidationError::InvalidInteger {
            param: "page",
            value: raw.to_string(),
        })
    }
}

/// Query parameters for the recommendation endpoint.
#[derive(Debug, Default)]
pub struct RecommendQueryParams {
    /// Latitude in degrees
    pub lat: Option<String>,

    /// Longitude in degrees
    pub lon: Option<String>,
}

impl RecommendQueryParams {
    pub fn from_query(query: Option<&str>) -> Self {
        Self {
            lat: query_value(query, "lat"),
            lon: query_value(query, "lon"),
        }
    }

    /// Parse the coordinates. Range checks are left to the service.
    pub fn point(&self) -> Result<GeoPoint, ValidationError> {
        let latitude = parse_number("lat", self.lat.as_deref())?;
        let longitude = parse_number("lon", self.lon.as_deref())?;
        Ok(GeoPoint::new(latitude, longitude))
    }
}

/// First decoded value of `key` in a raw query string.
fn query_value(query: Option<&str>, key: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k.as_ref() == key)
        .map(|(_, v)| v.into_owned())
}

fn required<'a>(param: &'static str, raw: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match raw {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingParameter(param)),
    }
}

fn parse_number(param: &'static str, raw: Option<&str>) -> Result<f64, ValidationError> {
    let raw = required(param, raw)?;
    raw.parse().map_err(|_| ValidationError::InvalidNumber {
        param,
        value: raw.to_string(),
    })
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_page", "upstream_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Response from the recommendation endpoint.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// Always `"places"`
    pub name: String,

    /// Nearest places, closest first
    pub places: Vec<Place>,
}

/// Response from the token endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let body = ErrorResponse::with_status(error_type, message, status);
    (status, Json(body)).into_response()
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let error_type = match &self {
            ValidationError::MissingParameter(_) => "missing_parameter",
            ValidationError::InvalidInteger { .. } | ValidationError::InvalidNumber { .. } => {
                "invalid_parameter"
            }
            ValidationError::PageOutOfRange { .. } => "invalid_page",
            ValidationError::CoordinateOutOfRange { .. } => "invalid_coordinate",
        };
        error_response(StatusCode::BAD_REQUEST, error_type, self.to_string())
    }
}

/// Convert BackendError to HTTP response.
///
/// The backend sits behind us, so its failures are gateway errors:
/// timeouts map to 504, everything else to 502.
impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            BackendError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            _ => (StatusCode::BAD_GATEWAY, "upstream_error"),
        };
        error_response(status, error_type, self.to_string())
    }
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "decode_error",
            self.to_string(),
        )
    }
}

impl IntoResponse for PlaceError {
    fn into_response(self) -> Response {
        match self {
            PlaceError::Validation(err) => err.into_response(),
            PlaceError::Upstream(err) => err.into_response(),
            PlaceError::Decode(err) => err.into_response(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle listing requests.
///
/// # Endpoint
///
/// `GET /api/places?page={page}`
///
/// # Response
///
/// - `200 OK` with `{"Places": [...], "Total": n, "Page": n, "Last": n}`
/// - `400 Bad Request` if `page` is missing, not an integer or out of range
/// - `502 Bad Gateway` / `504 Gateway Timeout` on backend failure
/// - `500 Internal Server Error` if the backend response cannot be decoded
pub async fn places_handler<B: SearchBackend + 'static>(
    State(state): State<AppState<B>>,
    RawQuery(query): RawQuery,
) -> Result<Json<PagedResult<Place>>, PlaceError> {
    let page = PlacesQueryParams::from_query(query.as_deref()).page()?;
    let result = state.place_service.list_places(page).await?;
    Ok(Json(result))
}

/// Handle recommendation requests.
///
/// Authentication is enforced by middleware before this runs.
///
/// # Endpoint
///
/// `GET /api/recommend?lat={lat}&lon={lon}`
///
/// # Response
///
/// - `200 OK` with `{"name": "places", "places": [...]}` (at most 3)
/// - `400 Bad Request` on missing, non-numeric or out-of-range coordinates
/// - `502 Bad Gateway` / `504 Gateway Timeout` on backend failure
pub async fn recommend_handler<B: SearchBackend + 'static>(
    State(state): State<AppState<B>>,
    RawQuery(query): RawQuery,
) -> Result<Json<RecommendationResponse>, PlaceError> {
    let point = RecommendQueryParams::from_query(query.as_deref()).point()?;
    let places = state.place_service.recommend(point).await?;

    Ok(Json(RecommendationResponse {
        name: "places".to_string(),
        places,
    }))
}

/// Issue an access token.
///
/// # Endpoint
///
/// `GET /api/get_token`
pub async fn token_handler<B: SearchBackend + 'static>(
    State(state): State<AppState<B>>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = state.authenticator.issue()?;
    debug!("Issued access token");
    Ok(Json(TokenResponse { token }))
}

/// Health check endpoint.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> Response {
    warn!("No route matched request");
    let status = StatusCode::NOT_FOUND;
    let body = ErrorResponse::with_status("not_found", "Resource not found", status);
    (status, Json(body)).into_response()
}

// =============================================================================
// Tests
// =============================================================================
