use anyhow::{bail, Context, Result};

/// Where interview questions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionMode {
    /// Live chat-completion calls.
    Llm,
    /// Fixed ML question bank — no external calls (demo mode).
    Static,
}

/// How candidate answers are graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerMode {
    /// Deterministic keyword/overlap heuristic.
    Heuristic,
    /// LLM-graded, falling back to the heuristic on call failure.
    Llm,
}

/// Application configuration loaded from environment variables.
/// Startup fails with a clear message if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat API key. Only required when an LLM-backed mode is selected;
    /// absence in that case is a fatal startup error, not a silent degrade.
    pub groq_api_key: Option<String>,
    pub question_mode: QuestionMode,
    pub scorer_mode: ScorerMode,
    pub cache_ttl_secs: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    pub breaker_cooldown_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let question_mode = match env_or("QUESTION_SOURCE", "llm").as_str() {
            "llm" => QuestionMode::Llm,
            "static" => QuestionMode::Static,
            other => bail!("QUESTION_SOURCE must be 'llm' or 'static', got '{other}'"),
        };

        let scorer_mode = match env_or("ANSWER_SCORER", "heuristic").as_str() {
            "heuristic" => ScorerMode::Heuristic,
            "llm" => ScorerMode::Llm,
            other => bail!("ANSWER_SCORER must be 'heuristic' or 'llm', got '{other}'"),
        };

        let needs_key =
            question_mode == QuestionMode::Llm || scorer_mode == ScorerMode::Llm;

        let groq_api_key = match std::env::var("GROQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ if needs_key => bail!(
                "GROQ_API_KEY is not set but an LLM-backed mode is selected \
                 (QUESTION_SOURCE or ANSWER_SCORER = 'llm')"
            ),
            _ => None,
        };

        Ok(Config {
            groq_api_key,
            question_mode,
            scorer_mode,
            cache_ttl_secs: parse_env_or("CACHE_TTL_SECS", 3600)?,
            rate_limit_max_requests: parse_env_or("RATE_LIMIT_MAX_REQUESTS", 10)?,
            rate_limit_window_secs: parse_env_or("RATE_LIMIT_WINDOW_SECS", 60)?,
            breaker_cooldown_secs: parse_env_or("BREAKER_COOLDOWN_SECS", 300)?,
            port: parse_env_or("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
