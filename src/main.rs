//! Places API - paged listing and nearest-place recommendations.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use places_api::{
    config::{
        CheckConfig, Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat,
        RECOMMENDED_SECRET_LEN,
    },
    places::PlaceService,
    server::{create_router, RouterConfig, TokenAuthenticator},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Token(config) => run_token(config),
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let backend = match config.backend.build_backend() {
        Ok(backend) => backend,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("places-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Backend: {}", config.backend.es_url);
    info!("  Index: {}", config.backend.es_index);
    match config.backend.backend_timeout {
        Some(secs) => info!("  Backend timeout: {}s", secs),
        None => info!("  Backend timeout: none"),
    }
    info!("  Page size: {}", config.page_size);
    info!("  Max result window: {}", config.max_result_window);
    info!("  Token TTL: {}s", config.token_ttl);

    if config.has_weak_secret() {
        warn!(
            "  Token secret is shorter than {} bytes; use a longer secret in production",
            RECOMMENDED_SECRET_LEN
        );
    }

    // The server still starts when the backend is down; requests get 502 until it is up
    match backend.count_documents().await {
        Ok(count) => info!("  Catalog: {} place(s)", count),
        Err(e) => warn!("  Backend not reachable yet: {}", e),
    }

    let service = PlaceService::new(backend)
        .with_page_size(config.page_size)
        .with_max_result_window(config.max_result_window);
    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/api/places?page=1", addr);
    info!("    curl http://{}/api/get_token", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "places_api=debug,tower_http=debug"
    } else {
        "places_api=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config =
        RouterConfig::new(config.auth_secret_or_empty()).with_token_ttl(config.token_ttl());

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

// =============================================================================
// Token Command
// =============================================================================

fn run_token(config: TokenConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let auth = TokenAuthenticator::new(config.auth_secret_or_empty())
        .with_ttl(std::time::Duration::from_secs(config.ttl));

    let token = match auth.issue() {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        TokenOutputFormat::Token => println!("{}", token),
        TokenOutputFormat::Header => println!("Authorization: Bearer {}", token),
        TokenOutputFormat::Json => {
            let claims = match auth.verify(&token) {
                Ok(claims) => claims,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let json = serde_json::json!({
                "token": token,
                "issuer": claims.iss,
                "issued_at": claims.iat,
                "expires_at": claims.exp,
                "ttl": config.ttl,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Places API Configuration Check");
    println!("══════════════════════════════");
    println!();

    if let Err(e) = config.backend.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let backend = match config.backend.build_backend() {
        Ok(backend) => backend,
        Err(e) => {
            println!("✗ Backend: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("✓ Backend: {}", config.backend.es_url);
    println!("✓ Index: {}", config.backend.es_index);
    println!();

    print!("Counting documents... ");

    match backend.count_documents().await {
        Ok(count) => {
            println!("✓ {} place(s)", count);
            if count == 0 {
                println!();
                println!("  The index is empty; /api/places will reject every page.");
            }
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - The backend is running at {}", config.backend.es_url);
            println!(
                "  - The index '{}' exists and has been loaded",
                config.backend.es_index
            );
            if config.backend.es_username.is_some() {
                println!("  - The backend credentials are correct");
            }
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
