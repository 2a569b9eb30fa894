use thiserror::Error;

/// Errors raised while talking to the search backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Network or connection error (backend unreachable)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend answered with a non-success status code
    #[error("Backend returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Backend did not answer within the configured timeout
    #[error("Backend request timed out")]
    Timeout,

    /// The index does not exist on the backend
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Backend answered with a body that is not what the endpoint returns
    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Map a reqwest transport error onto the backend error taxonomy.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Connection(err.to_string())
        }
    }
}

/// Errors in the top-level shape of a search result envelope.
///
/// A malformed individual hit is never reported here; the decoder skips it.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Body is not valid JSON
    #[error("Malformed response body: {0}")]
    MalformedJson(String),

    /// The `hits.hits` list is absent or not an array
    #[error("Response is missing the hit list")]
    MissingHits,

    /// A total hit count was requested but the envelope has none
    #[error("Response is missing the total hit count")]
    MissingTotal,

    /// The total hit count has an unexpected shape
    #[error("Invalid total hit count: {0}")]
    InvalidTotal(String),
}

/// Client input errors. Always surfaced as 400 Bad Request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required query parameter is absent or empty
    #[error("Missing required query parameter '{0}'")]
    MissingParameter(&'static str),

    /// Parameter is not an integer
    #[error("Invalid '{param}' value: '{value}' is not an integer")]
    InvalidInteger { param: &'static str, value: String },

    /// Parameter is not a number
    #[error("Invalid '{param}' value: '{value}' is not a number")]
    InvalidNumber { param: &'static str, value: String },

    /// Requested page lies outside `1..=last_page`
    #[error("Invalid 'page' value: {page} (valid range: 1-{last_page})")]
    PageOutOfRange { page: i64, last_page: u64 },

    /// Latitude or longitude outside the valid WGS84 range
    #[error("Invalid '{param}' value: {value} (valid range: {min} to {max})")]
    CoordinateOutOfRange {
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors returned by the place service.
#[derive(Debug, Clone, Error)]
pub enum PlaceError {
    /// Request parameters were rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend unreachable or returned an error status
    #[error("Upstream error: {0}")]
    Upstream(#[from] BackendError),

    /// Backend response could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}
