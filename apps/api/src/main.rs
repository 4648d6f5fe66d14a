mod applications;
mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod jobs;
mod models;
mod routes;
mod state;
mod storage;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::session::RedisSessionStore;
use crate::config::{Backend, Config};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3BlobStore;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    let state = build_state(config.clone()).await?;

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wires the stores for the configured backend.
async fn build_state(config: Config) -> Result<AppState> {
    let infra = match &config.backend {
        Backend::Memory => {
            info!("Using in-memory stores; data is lost on restart");
            return Ok(AppState::in_memory(config));
        }
        Backend::Postgres(infra) => infra.clone(),
    };

    // Initialize PostgreSQL
    let db = create_pool(&infra.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(infra.redis_url.clone())?;
    let sessions = RedisSessionStore::connect(&redis).await?;

    // Initialize S3 / MinIO
    let blobs = S3BlobStore::from_config(&infra).await;
    info!("S3 client initialized (bucket: {})", infra.s3_bucket);

    Ok(AppState {
        store: Arc::new(PgStore::new(db)),
        sessions: Arc::new(sessions),
        blobs: Arc::new(blobs),
        config,
    })
}
