//! xAPI LRS - Binary Entry Point
//!
//! This is the main entry point for the lrs-server binary.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use xapi_lrs::api::{create_router, AppState};
use xapi_lrs::config::LrsConfig;
use xapi_lrs::service::StatementService;
use xapi_lrs::store::{JsonlStore, MemoryStore, StatementStore};
use xapi_lrs::types::LrsResult;

#[tokio::main]
async fn main() -> LrsResult<()> {
    let config = LrsConfig::from_env()?;
    init_tracing(&config.log_level);

    let store: Arc<dyn StatementStore> = match config.store_config() {
        Some(store_config) => {
            tracing::info!(path = %store_config.statements_path().display(), "using file store");
            Arc::new(JsonlStore::open(store_config)?)
        }
        None => {
            tracing::warn!("LRS_DATA_DIR not set, statements are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let service = StatementService::new(store, config.service_options());
    let app = create_router(Arc::new(AppState::new(service)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("{} v{} listening on {}", xapi_lrs::NAME, xapi_lrs::VERSION, config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xapi_lrs={level},lrs_server={level},tower_http={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received");
}
