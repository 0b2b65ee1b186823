mod error;
mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use judgeline_common::config::Config;
use judgeline_common::languages::LanguageTable;
use judgeline_engine::{GeminiGenerator, GenerationCache, Harness, JdoodleEngine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

pub struct AppState {
    pub harness: Harness,
    pub cache: GenerationCache,
    pub model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("Judgeline API booting...");

    let config = Config::from_env().context("Invalid configuration")?;

    let languages = match &config.execution.languages_file {
        Some(path) => LanguageTable::load(path)
            .with_context(|| format!("Failed to load languages from {}", path.display()))?,
        None => LanguageTable::default(),
    };
    info!(languages = languages.entries().len(), "Language table loaded");

    if config.execution.client_id.is_none() || config.execution.client_secret.is_none() {
        warn!("JD_CLIENT_ID / JD_CLIENT_SECRET not set; code execution requests will fail");
    }
    if config.generation.api_key.is_none() {
        warn!("GEMINI_API_KEY not set; generation requests will fail");
    }

    let engine = JdoodleEngine::new(&config.execution).context("Failed to build execution client")?;
    let generator =
        GeminiGenerator::new(&config.generation).context("Failed to build generation client")?;

    let model = generator.model().to_string();
    let state = Arc::new(AppState {
        harness: Harness::new(Arc::new(engine), languages, &config.execution),
        cache: GenerationCache::new(Arc::new(generator), config.generation.cache_capacity),
        model,
    });

    info!(
        concurrency = config.execution.concurrency,
        execution_timeout_s = config.execution.timeout.as_secs(),
        cache_capacity = config.generation.cache_capacity,
        model = %state.model,
        "Harness and generation cache ready"
    );

    let app = routes::router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                warn!("Received shutdown signal, finishing in-flight requests...");
            }
        })
        .await
        .context("Server error")?;

    info!("API shutdown complete");
    Ok(())
}
