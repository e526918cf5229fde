//! Coherent Cache - caching product service
//!
//! Serves products read-through a local TTL/LRU cache and keeps peer
//! processes coherent through a Redis invalidation channel.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coherent_cache::api::{create_router, AppState};
use coherent_cache::bus::{spawn_listener, InvalidationBus, RedisTransport, ReconnectPolicy};
use coherent_cache::cache::SharedCache;
use coherent_cache::catalog::{Coordinator, SqliteProductStore};
use coherent_cache::{spawn_sweep_task, Config};

/// Main entry point for the caching service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables (fatal on error)
/// 3. Open and seed the product store
/// 4. Create the cache and the Redis-backed invalidation bus
/// 5. Start the invalidation listener and the optional expiry sweep
/// 6. Serve HTTP until SIGINT/SIGTERM, then stop background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coherent_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coherent Cache service");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: capacity={}, default_ttl={}s, channel={}, port={}, sweep_interval={}s",
        config.capacity, config.default_ttl, config.channel, config.server_port, config.sweep_interval
    );

    let store = SqliteProductStore::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))?;
    store.init_and_seed().context("initializing database")?;

    let cache = SharedCache::new(config.capacity, config.default_ttl_duration())?;
    let transport = RedisTransport::new(&config.redis_url)?;
    let bus = InvalidationBus::new(Arc::new(transport), config.channel.clone());
    info!(origin = bus.origin(), "Invalidation bus ready");

    let listener = spawn_listener(&bus, cache.clone(), ReconnectPolicy::default());
    let sweep = (config.sweep_interval > 0)
        .then(|| spawn_sweep_task(cache.clone(), config.sweep_interval));

    let state = AppState::new(
        Coordinator::new(cache, Arc::new(store), bus),
        listener.metrics(),
    );
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let tcp = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = sweep {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
    listener.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
