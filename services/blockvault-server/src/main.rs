//! BlockVault Analyze Server
//!
//! Thin HTTP surface over the extraction pipeline. Accepts a wallet address
//! plus its raw transaction history and returns the validated reliability
//! assessment, ready for a downstream proof relayer.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! blockvault-server
//!
//! # Start with custom config
//! blockvault-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! BLOCKVAULT__SERVER__PORT=8080 blockvault-server
//! ```

mod config;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blockvault_extraction::Extractor;
use blockvault_llm::ProviderPair;

use crate::config::ServerConfig;
use crate::routes::{create_router, AppState};

// =============================================================================
// CLI Arguments
// =============================================================================

/// BlockVault Analyze Server - reliability oracle for lending protocols
#[derive(Parser, Debug)]
#[command(name = "blockvault-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "BLOCKVAULT_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "BLOCKVAULT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "BLOCKVAULT_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BLOCKVAULT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "BLOCKVAULT_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before configuration reads the environment
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting BlockVault Analyze Server"
    );

    // Resolve providers and build the pipeline
    let pair = ProviderPair::from_env();
    let (primary_ok, fallback_ok) = pair.availability().await;
    tracing::info!(
        primary = pair.primary().name(),
        primary_available = primary_ok,
        fallback = pair.fallback().name(),
        fallback_available = fallback_ok,
        "Providers resolved"
    );
    if !primary_ok && !fallback_ok {
        tracing::warn!("Neither provider is available; analyze requests will fail");
    }

    let extractor = Extractor::from_pair(pair, server_config.extraction.to_extractor_config());

    tracing::info!(schema = %extractor.schema(), "Extraction pipeline ready");

    // Create application state and router
    let state = Arc::new(AppState { extractor });
    let app = create_router(state);

    // Get bind address
    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // Allow time for in-flight requests to complete
    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["blockvault-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_development_config() {
        let config = ServerConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "debug");
    }
}
