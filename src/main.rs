//! Libris Server - Library Management System
//!
//! A TCP session server for library management.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{
    config::AppConfig,
    persistence::SnapshotStore,
    repository::Repository,
    server::Server,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the snapshot store and load persisted state
    let store = Arc::new(SnapshotStore::open(&config.storage.data_dir).await?);
    let (users, records) = store.load().await;
    let repository = Arc::new(Repository::with_data(users, records));

    // Create services and application state
    let services = Arc::new(Services::new(
        Arc::clone(&repository),
        Arc::clone(&store),
    ));
    let state = AppState {
        config: Arc::new(config),
        services,
    };

    // Start the listener
    let server = Server::bind(&state).await?;
    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run_until_ctrl_c().await?;

    // Final flush: make sure every committed mutation is durable
    let snapshot = repository.snapshot();
    if let Err(err) = store.persist(&snapshot).await {
        tracing::error!(error = %err, "final snapshot write failed");
    } else {
        tracing::info!("state saved, shutting down");
    }

    Ok(())
}
