//! Configuration management for the places API.
//!
//! This module provides the command-line interface, which supports:
//! - Command-line arguments via clap
//! - Environment variables with `PLACES_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `serve` - Run the HTTP server
//! - `token` - Issue an access token offline
//! - `check` - Verify backend connectivity and report the catalog size
//!
//! # Environment Variables
//!
//! - `PLACES_HOST` - Server bind address (default: 0.0.0.0)
//! - `PLACES_PORT` - Server port (default: 8888)
//! - `PLACES_ES_URL` - Elasticsearch URL (default: http://localhost:9200)
//! - `PLACES_ES_INDEX` - Index holding the catalog (default: places)
//! - `PLACES_ES_USERNAME` / `PLACES_ES_PASSWORD` - Basic auth for the backend
//! - `PLACES_BACKEND_TIMEOUT` - Per-request backend timeout in seconds
//! - `PLACES_AUTH_SECRET` - HMAC secret for access tokens (required)
//! - `PLACES_TOKEN_TTL` - Token lifetime in seconds (default: 3600)
//! - `PLACES_PAGE_SIZE` - Places per listing page (default: 10)
//! - `PLACES_MAX_RESULT_WINDOW` - Index `max_result_window` (default: 10000)
//! - `PLACES_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::places::{DEFAULT_MAX_RESULT_WINDOW, DEFAULT_PAGE_SIZE};
use crate::search::{ElasticsearchBackend, DEFAULT_ES_URL, DEFAULT_INDEX};
use crate::server::DEFAULT_TOKEN_TTL;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8888;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// Secrets
// =============================================================================

/// A string that is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Places API - paged listing and nearest-place recommendations over Elasticsearch.
#[derive(Parser, Debug, Clone)]
#[command(name = "places-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Issue an access token without running the server
    Token(TokenConfig),

    /// Check backend connectivity
    Check(CheckConfig),
}

/// Connection settings for the search backend.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Elasticsearch base URL.
    #[arg(long, default_value = DEFAULT_ES_URL, env = "PLACES_ES_URL")]
    pub es_url: String,

    /// Index holding the place catalog.
    #[arg(long, default_value = DEFAULT_INDEX, env = "PLACES_ES_INDEX")]
    pub es_index: String,

    /// Username for HTTP basic auth against the backend.
    #[arg(long, env = "PLACES_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Password for HTTP basic auth against the backend.
    #[arg(long, env = "PLACES_ES_PASSWORD", hide_env_values = true)]
    pub es_password: Option<SecretString>,

    /// Per-request backend timeout in seconds (no timeout if unset).
    #[arg(long, env = "PLACES_BACKEND_TIMEOUT")]
    pub backend_timeout: Option<u64>,
}

impl BackendArgs {
    /// Validate the backend settings.
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.es_url)
            .map_err(|e| format!("Invalid --es-url '{}': {}", self.es_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "Invalid --es-url '{}': scheme must be http or https",
                self.es_url
            ));
        }

        if self.es_index.is_empty() {
            return Err("Index name is required. Set --es-index or PLACES_ES_INDEX".to_string());
        }

        if self.es_password.is_some() && self.es_username.is_none() {
            return Err("--es-password requires --es-username".to_string());
        }

        if self.backend_timeout == Some(0) {
            return Err("backend_timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Build the Elasticsearch client from these settings.
    pub fn build_backend(&self) -> Result<ElasticsearchBackend, String> {
        let mut backend = ElasticsearchBackend::new(&self.es_url, self.es_index.clone())?;

        if let Some(ref username) = self.es_username {
            let password = self.es_password.as_ref().map(|p| p.expose().to_string());
            backend = backend.with_credentials(username.clone(), password);
        }
        if let Some(secs) = self.backend_timeout {
            backend = backend.with_timeout(Duration::from_secs(secs));
        }

        Ok(backend)
    }
}

/// Settings for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PLACES_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PLACES_PORT")]
    pub port: u16,

    // =========================================================================
    // Backend Configuration
    // =========================================================================
    #[command(flatten)]
    pub backend: BackendArgs,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Secret key for signing access tokens.
    ///
    /// The server refuses to start without it.
    #[arg(long, env = "PLACES_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<SecretString>,

    /// Lifetime of issued tokens in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL.as_secs(), env = "PLACES_TOKEN_TTL")]
    pub token_ttl: u64,

    // =========================================================================
    // Listing Configuration
    // =========================================================================
    /// Number of places per listing page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, env = "PLACES_PAGE_SIZE")]
    pub page_size: u64,

    /// Deepest `from + size` the index serves (its `max_result_window`).
    ///
    /// Pages past it are range-checked with a count before being fetched.
    #[arg(long, default_value_t = DEFAULT_MAX_RESULT_WINDOW, env = "PLACES_MAX_RESULT_WINDOW")]
    pub max_result_window: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PLACES_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match self.auth_secret {
            Some(ref secret) if !secret.is_empty() => {}
            _ => {
                return Err(
                    "No token secret provided. Set --auth-secret or PLACES_AUTH_SECRET".to_string(),
                )
            }
        }

        if self.token_ttl == 0 {
            return Err("token_ttl must be greater than 0".to_string());
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }

        if self.max_result_window < self.page_size {
            return Err("max_result_window must be at least page_size".to_string());
        }

        self.backend.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the token secret, or an empty string if unset (call validate() first).
    pub fn auth_secret_or_empty(&self) -> &str {
        self.auth_secret
            .as_ref()
            .map(SecretString::expose)
            .unwrap_or("")
    }

    /// Whether the secret is shorter than recommended.
    pub fn has_weak_secret(&self) -> bool {
        self.auth_secret
            .as_ref()
            .is_some_and(|s| s.len() < RECOMMENDED_SECRET_LEN)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl)
    }
}

/// Output format for the `token` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenOutputFormat {
    /// The bare token
    #[default]
    Token,

    /// `{"token": .., "expires_at": ..}`
    Json,

    /// A ready-to-use `Authorization` header
    Header,
}

/// Settings for the `token` command.
#[derive(Args, Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing the token (must match the server's).
    #[arg(long, env = "PLACES_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<SecretString>,

    /// Lifetime of the token in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL.as_secs())]
    pub ttl: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = TokenOutputFormat::Token)]
    pub format: TokenOutputFormat,
}

impl TokenConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.auth_secret {
            Some(ref secret) if !secret.is_empty() => {}
            _ => {
                return Err(
                    "No token secret provided. Set --auth-secret or PLACES_AUTH_SECRET".to_string(),
                )
            }
        }

        if self.ttl == 0 {
            return Err("ttl must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the token secret, or an empty string if unset (call validate() first).
    pub fn auth_secret_or_empty(&self) -> &str {
        self.auth_secret
            .as_ref()
            .map(SecretString::expose)
            .unwrap_or("")
    }
}

/// Settings for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
