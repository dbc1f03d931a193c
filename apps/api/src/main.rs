mod config;
mod errors;
mod extraction;
mod matching;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::matching::sections::KeywordSectionSplitter;
use crate::matching::similarity::{resolve_model, EmbeddingScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Load the embedding model once, before accepting traffic
    let model = resolve_model(&config.embedding_model).with_context(|| {
        format!(
            "EMBEDDING_MODEL '{}' is not a supported fastembed model",
            config.embedding_model
        )
    })?;
    let scorer = EmbeddingScorer::new(model);
    scorer.warm_up().await?;
    info!("Embedding scorer initialized (model: {})", config.embedding_model);

    // Build app state
    let state = AppState {
        config: config.clone(),
        splitter: Arc::new(KeywordSectionSplitter::new()),
        scorer: Arc::new(scorer),
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
