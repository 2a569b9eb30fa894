//! Bearer token authentication for the places API.
//!
//! This module issues and verifies short-lived HMAC-SHA256 signed tokens in
//! the compact JWT form, and provides the axum middleware that gates
//! protected routes.
//!
//! # Token Format
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(signature)
//!
//! header    = {"alg":"HS256","typ":"JWT"}
//! claims    = {"iss":"todo-app","iat":1735686000,"exp":1735689600}
//! signature = HMAC-SHA256(secret_key, base64url(header) "." base64url(claims))
//! ```
//!
//! Base64url is used without padding. Tokens are standard HS256 JWTs and
//! interoperate with any JWT library configured with the same secret.
//!
//! # Security Properties
//!
//! - **Time-limited**: tokens expire `ttl` after issuance (one hour by default)
//! - **Algorithm pinning**: only `HS256` headers are accepted
//! - **Constant-time comparison**: signatures are compared with `subtle`
//! - **Opaque failures**: clients only ever see `401 Unauthorized`; the reason
//!   is logged server-side without the token itself
//!
//! # Example
//!
//! ```rust
//! use places_api::server::auth::TokenAuthenticator;
//!
//! let auth = TokenAuthenticator::new("my-secret-key");
//!
//! let token = auth.issue().unwrap();
//! assert!(auth.is_valid(&token));
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use super::handlers::ErrorResponse;

// =============================================================================
// Types
// =============================================================================

/// HMAC-SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Issuer written into every token.
pub const DEFAULT_ISSUER: &str = "todo-app";

/// Default token lifetime (1 hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Required prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Authentication error types.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not of the form `Bearer <token>`
    InvalidScheme,

    /// Token is not three base64url segments of valid JSON
    MalformedToken,

    /// Token header names an algorithm other than HS256
    UnsupportedAlgorithm(String),

    /// Signature does not match
    InvalidSignature,

    /// Token has expired
    Expired {
        /// When the token expired
        expired_at: u64,
        /// Current time
        current_time: u64,
    },

    /// Token could not be produced
    Issuance(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing Authorization header"),
            AuthError::InvalidScheme => write!(f, "Authorization header is not a bearer token"),
            AuthError::MalformedToken => write!(f, "Malformed token"),
            AuthError::UnsupportedAlgorithm(alg) => {
                write!(f, "Unsupported token algorithm: {}", alg)
            }
            AuthError::InvalidSignature => write!(f, "Invalid token signature"),
            AuthError::Expired {
                expired_at,
                current_time,
            } => write!(
                f,
                "Token expired at {} (current time: {})",
                expired_at, current_time
            ),
            AuthError::Issuance(msg) => write!(f, "Failed to issue token: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Issuance(_) = self {
            error!(error_type = "token_issuance", "Server error: {}", self);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            let body = ErrorResponse::with_status("internal_error", "Failed to issue token", status);
            return (status, Json(body)).into_response();
        }

        // Bad signatures could indicate an attack, so log at warn level.
        // Missing and expired tokens are routine, log at debug.
        match &self {
            AuthError::InvalidSignature | AuthError::UnsupportedAlgorithm(_) => {
                warn!(status = 401, "Authentication failed: {}", self);
            }
            _ => {
                debug!(status = 401, "Authentication failed: {}", self);
            }
        }

        // The reason is never echoed back to the client
        let status = StatusCode::UNAUTHORIZED;
        let body = ErrorResponse::with_status("unauthorized", "Unauthorized", status);
        (status, Json(body)).into_response()
    }
}

/// Token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,

    /// Issued-at (Unix epoch seconds)
    pub iat: u64,

    /// Expiry (Unix epoch seconds)
    pub exp: u64,
}

// =============================================================================
// Token Authenticator
// =============================================================================

/// Issues and verifies HMAC-SHA256 signed access tokens.
///
/// The secret is fixed for the lifetime of the authenticator and is never
/// printed by `Debug`.
#[derive(Clone)]
pub struct TokenAuthenticator {
    /// Secret key for HMAC computation
    secret_key: Vec<u8>,

    /// Issuer claim
    issuer: String,

    /// Token lifetime
    ttl: Duration,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("secret_key", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenAuthenticator {
    /// Create a new authenticator with the given secret key.
    ///
    /// # Arguments
    ///
    /// * `secret_key` - The secret key used for HMAC computation. Should be
    ///   at least 32 bytes for security.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Set the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the issuer claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token valid from now for the configured TTL.
    pub fn issue(&self) -> Result<String, AuthError> {
        self.issue_at(unix_now())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, now: u64) -> Result<String, AuthError> {
        let claims = TokenClaims {
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };

        let header_json =
            serde_json::to_vec(&header).map_err(|e| AuthError::Issuance(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(claims).map_err(|e| AuthError::Issuance(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.compute_signature(&signing_input);

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify a token against the current time.
    ///
    /// # Returns
    ///
    /// The token's claims if the signature is valid and it has not expired.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<TokenClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken);
        };

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        // Verify the signature before trusting anything in the claims
        let provided_sig = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        let expected_sig = self.compute_signature(signing_input);

        if !bool::from(provided_sig.ct_eq(&expected_sig)) {
            return Err(AuthError::InvalidSignature);
        }

        let claims: TokenClaims = decode_segment(claims_b64)?;
        if now >= claims.exp {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
                current_time: now,
            });
        }

        Ok(claims)
    }

    /// Whether `token` is currently valid.
    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }

    /// Compute the HMAC-SHA256 of the signing input.
    fn compute_signature(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret_key)
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Bearer Gate
// =============================================================================

/// Authorize a request from its headers.
///
/// ```text
/// no Authorization header        -> MissingCredentials
/// header without "Bearer " prefix -> InvalidScheme
/// token fails verification       -> Malformed / InvalidSignature / Expired
/// otherwise                      -> Ok(claims)
/// ```
pub fn authorize_bearer(
    headers: &HeaderMap,
    auth: &TokenAuthenticator,
) -> Result<TokenClaims, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;
    let header = header.to_str().map_err(|_| AuthError::InvalidScheme)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidScheme)?;

    auth.verify(token)
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware requiring a valid bearer token.
///
/// Requests without a valid `Authorization: Bearer <token>` header are
/// rejected with 401 before reaching the handler. Verified claims are stored
/// in the request extensions.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::get};
/// use places_api::server::auth::{TokenAuthenticator, bearer_auth_middleware};
///
/// let auth = TokenAuthenticator::new("secret-key");
/// let app = Router::new()
///     .route("/api/recommend", get(recommend_handler))
///     .layer(middleware::from_fn_with_state(auth, bearer_auth_middleware));
/// ```
pub async fn bearer_auth_middleware(
    State(auth): State<TokenAuthenticator>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authorize_bearer(request.headers(), &auth)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
