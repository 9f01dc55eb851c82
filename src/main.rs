//! PDF Shelf Server
//!
//! Serves a nested folder of PDFs with generated cover thumbnails, a JSON
//! listing and a live viewer count.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_shelf_server::config::Config;
use pdf_shelf_server::covers::CoverBuilder;
use pdf_shelf_server::library::LibraryScanner;
use pdf_shelf_server::routes;
use pdf_shelf_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdf_shelf_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing::info!("Starting PDF Shelf Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("PDF folder: {}", config.library.pdf_dir.display());
    tracing::info!("Covers folder: {}", config.library.covers_dir.display());

    tokio::fs::create_dir_all(&config.library.covers_dir)
        .await
        .with_context(|| {
            format!("Failed to create covers folder {}", config.library.covers_dir.display())
        })?;

    // Build missing covers before accepting any traffic
    let scanner = LibraryScanner::new(&config.library.pdf_dir);
    let entries = tokio::task::spawn_blocking(move || scanner.scan_all())
        .await?
        .map_err(|e| {
            tracing::error!("Error scanning PDFs: {}", e);
            e
        })
        .context("Initial library scan failed")?;
    tracing::info!("Library contains {} PDFs", entries.len());

    let covers = CoverBuilder::from_config(&config.covers);
    let report = covers
        .build_all(&entries, &config.library.covers_dir, config.covers.concurrency)
        .await;
    for failed in &report.failed {
        tracing::warn!("No cover for {}", failed);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    let app = routes::app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("PDF Shelf Server listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
