//! catalog-server - live product catalog
//!
//! Serves the catalog over HTTP and pushes the merged view to SSE and
//! WebSocket subscribers after every change.

use anyhow::{Context, Result};
use catalog_server::cli::Cli;
use catalog_server::{build_router, AppState, CatalogService};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(
        "Starting catalog-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let config = cli.load_config()?;
    config
        .ensure_data_folder()
        .context("Failed to initialize data folder")?;

    info!("Catalog file: {}", config.products_path().display());
    info!("Live submissions file: {}", config.live_products_path().display());

    let service = CatalogService::open(&config);

    // Surface a malformed document at startup rather than on first request
    match service.merged_view().await {
        Ok(view) => info!("✓ Loaded {} items", view.len()),
        Err(e) => warn!("Catalog not readable yet: {}", e),
    }

    let app = build_router(AppState::new(service, config.sse_keepalive));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("catalog-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
