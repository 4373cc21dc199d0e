use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::interview::questions::QuestionSource;
use crate::interview::scoring::AnswerScorer;
use crate::interview::session::SessionStore;
use crate::metrics::MetricsCollector;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable question source. Default: LlmQuestionSource. Swap via QUESTION_SOURCE env.
    pub questions: Arc<dyn QuestionSource>,
    /// Pluggable answer scorer. Default: HeuristicScorer. Swap via ANSWER_SCORER env.
    pub scorer: Arc<dyn AnswerScorer>,
    /// Live interview sessions, each owning its cache and rate limiter.
    pub sessions: Arc<SessionStore>,
    /// Process-wide external-call metrics.
    pub metrics: Arc<Mutex<MetricsCollector>>,
}
