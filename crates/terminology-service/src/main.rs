//! Terminology HTTP server binary.

use std::net::SocketAddr;

use terminology_engine::InMemoryStore;
use terminology_service::{router, ServerConfig, TerminologyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Loading terminology definitions from: {}", config.data_path.display());

    let mut store = InMemoryStore::new();

    #[cfg(feature = "parallel")]
    let stats = store.load_dir_parallel(&config.data_path, &config.load)?;
    #[cfg(not(feature = "parallel"))]
    let stats = store.load_dir(&config.data_path, &config.load)?;

    if stats.skipped_files > 0 {
        tracing::warn!("Skipped {} malformed definition files", stats.skipped_files);
    }
    tracing::info!(
        "Loaded {} code systems, {} value sets, {} concept maps",
        store.code_system_count(),
        store.value_set_count(),
        store.concept_map_count()
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let server = TerminologyServer::with_config(store, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting terminology HTTP server on {}", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping server"),
        Err(e) => {
            tracing::warn!("Could not listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
