//! Grant Server Binary
//!
//! Runs the interaction webhook server.

use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use grant_server::{create_router, AppState, Dispatcher, GrantConfig, MemoryStore, RosterStore};

#[tokio::main]
async fn main() {
    let config = GrantConfig::from_env().expect("Invalid configuration");

    // Initialize logging
    let log_level = config.log_level.parse().unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Initialize storage
    let store = open_store(config.database_url.as_deref()).await;

    info!(
        public_key = %config.verifier.public_key_hex(),
        mr_roles = config.role_gate.tier_size(grant_core::TIER_MR),
        hr_roles = config.role_gate.tier_size(grant_core::TIER_HR),
        developers = config.developers.len(),
        port = config.port,
        "Starting Grant server"
    );

    let dispatcher = Dispatcher::new(store, config.role_gate, config.developers);
    let state = Arc::new(AppState {
        verifier: config.verifier,
        dispatcher,
    });

    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Grant server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(feature = "postgres")]
async fn open_store(database_url: Option<&str>) -> Arc<dyn RosterStore> {
    match database_url {
        Some(url) => Arc::new(
            grant_server::PostgresStore::new(url)
                .await
                .expect("Failed to open roster database"),
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, roster is held in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(database_url: Option<&str>) -> Arc<dyn RosterStore> {
    if database_url.is_some() {
        tracing::warn!("Built without postgres support, ignoring DATABASE_URL");
    }
    Arc::new(MemoryStore::new())
}
