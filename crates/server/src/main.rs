use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinescout_core::{
    load_config, validate_config, AnalyticsStore, MovieCatalog, SearchOrchestrator,
    SqliteAnalyticsStore, TmdbCatalogClient, TrendingAggregator,
};
use cinescout_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CINESCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Hash the sanitized config so the API key never reaches the log
    let sanitized_json = serde_json::to_string(&cinescout_core::SanitizedConfig::from(&config))
        .unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(sanitized_json.as_bytes()));

    info!(
        "CineScout {} configuration loaded (hash {})",
        VERSION,
        &config_hash[..16]
    );
    info!("Catalog base URL: {}", config.catalog.base_url());
    info!("Analytics database: {:?}", config.analytics.database_path);

    // Create SQLite analytics store
    let analytics: Arc<dyn AnalyticsStore> = Arc::new(
        SqliteAnalyticsStore::new(&config.analytics.database_path)
            .context("Failed to create analytics store")?,
    );
    info!("Analytics store initialized");

    // Create catalog client
    let catalog: Arc<dyn MovieCatalog> = Arc::new(
        TmdbCatalogClient::new(config.catalog.clone())
            .context("Failed to create catalog client")?,
    );
    info!("Catalog client initialized");

    // Start the search orchestrator
    let trending = TrendingAggregator::new(analytics, config.analytics.top_n);
    let search = SearchOrchestrator::new(config.search.clone(), catalog, trending).start();
    info!("Search orchestrator started");

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), search.clone()));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let queued trending writes land before exiting
    info!("Server shutting down...");
    if let Err(e) = search.shutdown().await {
        error!("Search orchestrator did not stop cleanly: {}", e);
    }
    info!("Search orchestrator stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
