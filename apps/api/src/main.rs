mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod schedule;
mod settings;
mod state;
mod storage;
mod tasks;
mod wishlist;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{postgres::PostgresStore, redis::RedisStore, KvStore, MemoryStore, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Secretary API v{}", env!("CARGO_PKG_VERSION"));

    info!("Connecting to {} storage", config.storage.name());
    let kv = connect_storage(&config.storage).await?;
    let storage = Storage::new(kv, config.storage_prefix.clone());
    info!(
        "Storage initialized (backend: {}, prefix: {})",
        storage.backend(),
        config.storage_prefix
    );

    let llm = LlmClient::from_config(&config)?;
    match &llm {
        Some(client) => info!("LLM client initialized (model: {})", client.model()),
        None => warn!("OPENAI_API_KEY not set, AI endpoints will use local fallbacks"),
    }

    let state = AppState::new(storage, llm);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_storage(backend: &StorageBackend) -> Result<Arc<dyn KvStore>> {
    let kv: Arc<dyn KvStore> = match backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            Arc::new(MemoryStore::default())
        }
        StorageBackend::Postgres { database_url } => {
            Arc::new(PostgresStore::new(create_pool(database_url).await?))
        }
        StorageBackend::Redis { redis_url } => Arc::new(RedisStore::connect(redis_url).await?),
    };
    Ok(kv)
}
