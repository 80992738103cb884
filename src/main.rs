//! Server entry point.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tarot_api::config::{load_config, AppConfig};
use tarot_api::content::CmsClient;
use tarot_api::lifecycle::Shutdown;
use tarot_api::translations::MemoryStore;
use tarot_api::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tarot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("tarot-api v0.1.0 starting");

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => AppConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        lock_ttl_secs = config.locks.ttl_secs,
        session_pool = config.session.pool_size,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => tarot_api::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let content = Arc::new(CmsClient::new(
        url::Url::parse(&config.content.base_url)?,
        config.content.timeout(),
    )?);
    let translations = Arc::new(MemoryStore::new());

    let server = HttpServer::new(config, content, translations);
    server.run(listener, Arc::new(Shutdown::new())).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
