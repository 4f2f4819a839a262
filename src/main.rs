//! KV Storage - An in-memory key-value cache server
//!
//! Provides TTL expiration, a background janitor and snapshot persistence
//! behind a small HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kv_storage::api::{create_router, AppState};
use kv_storage::cache::CacheStore;
use kv_storage::Config;

/// Main entry point for the KV Storage cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create cache store (starts the janitor)
/// 4. Merge the snapshot file into the cache if one exists
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM: stop the janitor and write a final snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kv_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting KV Storage server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, cleanup_interval={}s, capacity_hint={}, port={}, snapshot_file={}",
        config.default_ttl,
        config.cleanup_interval,
        config.capacity_hint,
        config.server_port,
        config.snapshot_file.display()
    );

    let state = AppState::from_config(&config);
    match state.cache.janitor_interval() {
        Some(interval) => info!("Janitor sweeping every {:?}", interval),
        None => info!("Janitor disabled, expired entries are only hidden on read"),
    }
    restore_snapshot(&state.cache, &config).await?;

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.cache.shutdown();

    persist_snapshot(&state.cache, &config).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Merges the snapshot file into the cache when it exists.
async fn restore_snapshot(cache: &Arc<CacheStore>, config: &Config) -> anyhow::Result<()> {
    let path = config.snapshot_file.clone();
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        info!("No snapshot at {}, starting empty", path.display());
        return Ok(());
    }

    let cache = Arc::clone(cache);
    let path_str = path.display().to_string();
    let loaded = tokio::task::spawn_blocking(move || cache.load_from_file(&path))
        .await
        .context("Snapshot restore task failed")?
        .with_context(|| format!("Failed to restore snapshot from {}", path_str))?;

    info!("Restored {} entries from {}", loaded, path_str);
    Ok(())
}

/// Writes the final snapshot before exit. Failures are logged, not fatal.
async fn persist_snapshot(cache: &Arc<CacheStore>, config: &Config) {
    let cache = Arc::clone(cache);
    let path = config.snapshot_file.clone();
    let path_str = path.display().to_string();

    match tokio::task::spawn_blocking(move || cache.save_to_file(&path)).await {
        Ok(Ok(saved)) => info!("Saved {} entries to {}", saved, path_str),
        Ok(Err(e)) => error!("Failed to save snapshot to {}: {}", path_str, e),
        Err(e) => error!("Snapshot save task failed: {}", e),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
