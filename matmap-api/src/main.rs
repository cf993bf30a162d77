//! matmap-api - MatMap restaurant recommendation service
//!
//! Serves quiz-driven restaurant search backed by Google Places and a photo
//! proxy for place images.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use matmap_api::api::health::BuildInfo;
use matmap_api::places::GooglePlacesClient;
use matmap_api::{build_router, logging, AppState};
use matmap_common::config::TomlConfig;
use matmap_common::{KeywordTable, QueryComposer};

/// Command-line arguments for matmap-api
#[derive(Parser, Debug)]
#[command(name = "matmap-api")]
#[command(about = "MatMap restaurant recommendation service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "MATMAP_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "MATMAP_HOST")]
    host: Option<String>,

    /// Keyword table file (overrides config file)
    #[arg(short, long, env = "MATMAP_KEYWORDS_FILE")]
    keywords: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_filter = logging::init();

    let args = Args::parse();

    let mut config =
        TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    logging::apply_config_level(&log_filter, &config.logging.level)
        .context("Failed to apply configured log level")?;

    info!(
        "Starting MatMap API (matmap-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        BuildInfo::CURRENT.git_hash,
        BuildInfo::CURRENT.timestamp,
        BuildInfo::CURRENT.profile
    );

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(keywords) = args.keywords {
        config.keywords_file = Some(keywords);
    }

    let table = match &config.keywords_file {
        Some(path) => KeywordTable::load(path)
            .with_context(|| format!("Failed to load keyword table {}", path.display()))?,
        None => {
            info!("Using built-in keyword table");
            KeywordTable::builtin()
        }
    };
    info!("Keyword table: {} answer tokens", table.len());

    let composer = QueryComposer::new(table, config.search.policy());

    let places = GooglePlacesClient::new(&config.places)
        .context("Failed to create Places client")?;
    if places.has_api_key() {
        info!("✓ Places API key configured");
    }

    let state = AppState::new(composer, Arc::new(places), config.places.photo_max_width);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("matmap-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
