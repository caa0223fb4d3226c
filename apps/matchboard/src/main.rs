mod career;
mod config;
mod embedding_client;
mod errors;
mod jobs;
mod matching;
mod models;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, SimilarityBackend};
use crate::embedding_client::EmbeddingClient;
use crate::jobs::JobCorpus;
use crate::matching::similarity::{EmbeddingSimilarity, LexicalSimilarity, SimilarityProvider};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matchboard v{}", env!("CARGO_PKG_VERSION"));

    // Load the job corpus
    let jobs = JobCorpus::from_path(&config.jobs_csv_path).with_context(|| {
        format!(
            "Failed to load job corpus from {}",
            config.jobs_csv_path.display()
        )
    })?;
    info!(
        "Job corpus loaded: {} postings, {} distinct titles",
        jobs.len(),
        jobs.titles().len()
    );

    // Initialize similarity backend (LexicalSimilarity by default; swap via SIMILARITY_BACKEND)
    let similarity = build_similarity(&config)?;
    info!("Similarity backend: {}", similarity.backend());
    info!(
        "Risk policy: {:?}, gap threshold {} months, job hopping below {} months",
        config.risk_policy, config.gap_threshold_months, config.job_hopping_threshold_months
    );

    // Build app state
    let state = AppState::new(config.clone(), jobs, similarity);

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

fn build_similarity(config: &Config) -> Result<Arc<dyn SimilarityProvider>> {
    match config.similarity_backend {
        SimilarityBackend::Lexical => Ok(Arc::new(LexicalSimilarity)),
        SimilarityBackend::Embedding => {
            let api_url = config
                .embedding_api_url
                .clone()
                .context("EMBEDDING_API_URL is required for the embedding backend")?;
            let client = EmbeddingClient::new(
                api_url,
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
            )
            .context("Failed to build embedding client")?;
            info!("Embedding client initialized (model: {})", client.model());
            Ok(Arc::new(EmbeddingSimilarity::new(client)))
        }
    }
}
