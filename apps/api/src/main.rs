mod config;
mod db;
mod documents;
mod embedding;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;
mod text_splitter;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{connect_options, create_pool, run_migrations};
use crate::documents::repository::PgDocumentRepository;
use crate::embedding::OllamaEmbedder;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::text_splitter::RecursiveCharacterSplitter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting document-ai v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(
        connect_options(&config.database)?,
        config.database_max_connections,
    )
    .await?;
    run_migrations(&db).await?;

    // Initialize Ollama clients
    let llm = LlmClient::new(
        &config.ollama_url,
        &config.generation_model_name,
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_retries,
    )?;
    info!(
        "LLM client initialized (model: {}, url: {})",
        llm.model(),
        config.ollama_url
    );

    let embedder = OllamaEmbedder::new(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?,
        &config.ollama_url,
        &config.embeddings_model_name,
        config.embeddings_dimensions,
    );
    info!(
        "Embedding client initialized (model: {}, dim: {})",
        config.embeddings_model_name,
        embedder.dimensions()
    );

    let splitter = RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap);

    // Build app state
    let state = AppState {
        documents: Arc::new(PgDocumentRepository::new(db)),
        llm,
        embedder,
        splitter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
