mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod portfolio;
mod registry;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, create_store};
use crate::extraction::{RedisRotationCounter, ResumeExtractor, RotationCounter};
use crate::llm_client::VisionClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the portfolio table
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(create_store(db).await?);

    // Initialize Redis (optional shared key-rotation index)
    let counter: Option<Arc<dyn RotationCounter>> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis client initialized for key rotation");
            Some(Arc::new(RedisRotationCounter::new(client)))
        }
        None => {
            warn!("REDIS_URL not set; key rotation starts at the first key on every call");
            None
        }
    };

    // Initialize vision client
    let vision = VisionClient::new(
        config.vision_base_url.clone(),
        config.vision_model.clone(),
        config.site_url.clone(),
    );
    info!(
        "Vision client initialized (model: {}, keys: {})",
        vision.model(),
        config.vision_api_keys.len()
    );

    let extractor = ResumeExtractor::new(
        Arc::new(vision),
        config.vision_api_keys.clone(),
        counter,
    );

    // Build app state
    let state = AppState {
        store,
        extractor: Arc::new(extractor),
        config: config.clone(),
    };

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
