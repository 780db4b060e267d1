mod bank;
mod config;
mod errors;
mod ingest;
mod llm_client;
mod routes;
mod session;
mod state;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bank::LlmQuestionGenerator;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::LlmAnswerCritic;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coach API v{}", env!("CARGO_PKG_VERSION"));

    // One LLM client shared by the question generator and the answer critic
    let llm = LlmClient::new(config.openai_api_key.clone());
    info!(
        "LLM client initialized (qgen: {}, critique: {})",
        config.qgen_model, config.critique_model
    );

    let question_generator = Arc::new(LlmQuestionGenerator::new(
        llm.clone(),
        config.qgen_model.clone(),
    ));
    let answer_critic = Arc::new(LlmAnswerCritic::new(llm, config.critique_model.clone()));

    // Build app state — sessions live in-process only, nothing is persisted
    let state = AppState {
        question_generator,
        answer_critic,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
///
/// Event targets use the crate name (`coach_api::...`), not the hyphenated
/// package name, so the directive must match the crate name or the service
/// logs nothing by default.
fn default_log_directive(rust_log: &str) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log)
}
