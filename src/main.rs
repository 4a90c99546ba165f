//! AlgoArena - Application Entry Point
//!
//! This is the main entry point for the AlgoArena pipeline server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use algoarena::{
    config::CONFIG,
    handlers,
    judge::{HttpJudgeClient, JudgeClient},
    notify::{CacheInvalidator, HttpRevalidator, NoopInvalidator},
    state::AppState,
    store::{MemoryStore, PgStore, Store},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AlgoArena pipeline server...");

    // Initialize the store
    let store: Arc<dyn Store> = match &CONFIG.database.url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = PgStore::connect(url, CONFIG.database.max_connections).await?;

            tracing::info!("Running database migrations...");
            store.run_migrations().await?;

            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using volatile in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize the external judge client
    let judge: Arc<dyn JudgeClient> = Arc::new(HttpJudgeClient::new(&CONFIG.judge)?);
    tracing::info!(judge_url = %CONFIG.judge.url, "External judge configured");

    // Initialize the cache invalidation sink
    let invalidator: Arc<dyn CacheInvalidator> = match &CONFIG.revalidate.url {
        Some(_) => Arc::new(HttpRevalidator::new(&CONFIG.revalidate)?),
        None => Arc::new(NoopInvalidator),
    };

    // Create application state
    let state = AppState::new(store, judge, invalidator, CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
