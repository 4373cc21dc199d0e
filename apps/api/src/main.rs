mod cache;
mod config;
mod errors;
mod interview;
mod llm_client;
mod metrics;
mod rate_limit;
mod report;
mod resume;
mod routes;
mod state;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, QuestionMode, ScorerMode};
use crate::interview::questions::{LlmQuestionSource, QuestionSource, StaticQuestionSource};
use crate::interview::scoring::{AnswerScorer, HeuristicScorer, LlmScorer};
use crate::llm_client::ChatClient;
use crate::metrics::MetricsCollector;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first: a missing API key for an LLM-backed mode
    // must fail here, before any interview flow exists.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the chat client when any strategy needs it
    let chat = match &config.groq_api_key {
        Some(key) => Some(ChatClient::new(key.clone())?),
        None => None,
    };

    // Select the question source (QUESTION_SOURCE: llm | static)
    let questions: Arc<dyn QuestionSource> = match config.question_mode {
        QuestionMode::Llm => {
            let chat = chat
                .clone()
                .context("QUESTION_SOURCE=llm requires GROQ_API_KEY")?;
            info!("question source: llm (model: {})", llm_client::MODEL);
            Arc::new(LlmQuestionSource::new(chat))
        }
        QuestionMode::Static => {
            info!("question source: static bank");
            Arc::new(StaticQuestionSource)
        }
    };

    // Select the answer scorer (ANSWER_SCORER: heuristic | llm)
    let scorer: Arc<dyn AnswerScorer> = match config.scorer_mode {
        ScorerMode::Llm => {
            let chat = chat.context("ANSWER_SCORER=llm requires GROQ_API_KEY")?;
            info!("answer scorer: llm-graded with heuristic fallback");
            Arc::new(LlmScorer::new(chat))
        }
        ScorerMode::Heuristic => {
            info!("answer scorer: heuristic");
            Arc::new(HeuristicScorer)
        }
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        questions,
        scorer,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        metrics: Arc::new(Mutex::new(MetricsCollector::new())),
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
