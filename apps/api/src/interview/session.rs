//! Interview sessions — explicit per-candidate state replacing the ambient
//! session dictionary of the original UI framework.
//!
//! Each session owns its own response cache and rate limiter; everything is
//! discarded when the session is removed or the process exits. The store is
//! mutex-guarded because axum serves requests concurrently.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::interview::scoring::ScoreBreakdown;
use crate::rate_limit::RateLimiter;

/// Questions asked per interview.
pub const MAX_QUESTIONS: u32 = 5;

/// One question/answer/score record in the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub score: u32,
    pub feedback: String,
    pub reasoning: String,
    pub breakdown: ScoreBreakdown,
}

pub struct InterviewSession {
    pub id: Uuid,
    pub candidate: String,
    pub role: String,
    pub resume_text: String,
    pub skills: Vec<String>,
    pub transcript: Vec<Exchange>,
    pub total_score: u32,
    /// The question awaiting an answer, if the interview is still running.
    pub pending_question: Option<String>,
    pub cache: ResponseCache,
    pub limiter: RateLimiter,
    pub started_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(candidate: String, role: String, resume_text: String, skills: Vec<String>, config: &Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            role,
            resume_text,
            skills,
            transcript: Vec::new(),
            total_score: 0,
            pending_question: None,
            cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs)),
            limiter: RateLimiter::new(
                config.rate_limit_max_requests,
                Duration::from_secs(config.rate_limit_window_secs),
                Duration::from_secs(config.breaker_cooldown_secs),
            ),
            started_at: Utc::now(),
        }
    }

    /// Records an answered question and updates the running total.
    pub fn record_exchange(&mut self, exchange: Exchange) {
        self.total_score += exchange.score;
        self.transcript.push(exchange);
        self.pending_question = None;
    }

    /// 1-based number of the next question to ask.
    pub fn next_question_number(&self) -> u32 {
        self.transcript.len() as u32 + 1
    }

    pub fn is_complete(&self) -> bool {
        self.transcript.len() as u32 >= MAX_QUESTIONS && self.pending_question.is_none()
    }
}

/// All live sessions, keyed by session id.
pub type SessionStore = Mutex<HashMap<Uuid, InterviewSession>>;
