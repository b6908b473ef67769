//! Coalesce Cache - diagnostics server
//!
//! Hosts the process-wide cache instance, sweeps expired entries in the
//! background and serves the diagnostics API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coalesce_cache::api::create_router;
use coalesce_cache::{spawn_cleanup_task, AppState, Cache, Config};

/// Main entry point for the cache diagnostics server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the single cache instance for this process
/// 4. Start background expiry sweep task
/// 5. Create Axum router with the diagnostics endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coalesce_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coalesce Cache");

    // Cache and server settings from the environment
    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}ms, default_stale_window={}ms, port={}, cleanup_interval={}s",
        config.cache.max_entries,
        config.cache.default_ttl.as_millis(),
        config.cache.default_stale_window.as_millis(),
        config.server_port,
        config.cleanup_interval
    );

    // One cache per process; consumers receive clones of this handle.
    let cache: Cache<serde_json::Value> = Cache::new(config.cache);
    info!("Cache initialized");

    // Periodic expiry sweep
    let cleanup_handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
    info!("Background expiry sweep started");

    // Diagnostics endpoints over the shared handle
    let app = create_router(AppState::new(cache));

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Serve until SIGINT/SIGTERM
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    // Stop the sweep before the runtime winds down
    cleanup_handle.abort();
    warn!("Expiry sweep task aborted");
}
