//! Answer scoring — pluggable, trait-based scorer for candidate answers.
//!
//! Default: `HeuristicScorer` (pure-Rust, fast, deterministic, fully testable).
//! Optional: `LlmScorer` (graded by the chat model, heuristic fallback).
//!
//! `AppState` holds an `Arc<dyn AnswerScorer>`, swapped at startup via config.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::{GRADER_SYSTEM, GRADE_PROMPT_TEMPLATE};
use crate::llm_client::{ChatClient, ChatMessage};

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Keywords that signal analytical depth in an answer. Each distinct keyword
/// present is worth 2 points, capped at 7.
const DEPTH_KEYWORDS: &[&str] = &[
    "algorithm",
    "complexity",
    "optimize",
    "pattern",
    "design",
    "approach",
    "logic",
    "example",
    "code",
    "tradeoff",
    "efficient",
];

const BASE_SCORE: u32 = 10;
const MAX_SCORE: u32 = 20;
const MAX_DEPTH: u32 = 7;
const MAX_CLARITY: u32 = 3;
const MAX_RELEVANCE: u32 = 3;
const MIN_ANSWER_CHARS: usize = 20;

/// Per-dimension sub-scores behind a total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub depth: u32,
    pub clarity: u32,
    pub relevance: u32,
}

/// Full scoring result returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub feedback: String,
    pub reasoning: String,
    pub breakdown: ScoreBreakdown,
}

impl ScoreResult {
    /// Zero-score fallback used when a scorer backend fails outright.
    pub fn error_fallback() -> Self {
        Self {
            score: 0,
            feedback: "Error".to_string(),
            reasoning: "Scoring failed".to_string(),
            breakdown: ScoreBreakdown {
                depth: 0,
                clarity: 0,
                relevance: 0,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The answer scorer trait. Implement this to swap backends without touching
/// the endpoint, handler, or caller code.
///
/// Carried in `AppState` as `Arc<dyn AnswerScorer>`.
#[async_trait]
pub trait AnswerScorer: Send + Sync {
    async fn score(
        &self,
        question: &str,
        answer: &str,
        resume_text: &str,
    ) -> Result<ScoreResult, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic keyword/overlap scorer. No LLM call.
///
/// Algorithm:
/// 1. Trimmed answer under 20 chars → fixed {5, {1,1,1}} short-circuit.
/// 2. Base 10; depth = 2 × distinct analytical keywords, capped at 7.
/// 3. Clarity = sentence count ('.'-separated, trimmed), capped at 3.
/// 4. Relevance = |resume words ∩ answer words| / 10, capped at 3.
/// 5. Total clamped to 20 (maxed sub-scores would otherwise reach 23).
pub struct HeuristicScorer;

#[async_trait]
impl AnswerScorer for HeuristicScorer {
    async fn score(
        &self,
        question: &str,
        answer: &str,
        resume_text: &str,
    ) -> Result<ScoreResult, AppError> {
        Ok(score_answer(question, answer, resume_text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmScorer — graded by the chat model
// ────────────────────────────────────────────────────────────────────────────

/// Expected JSON shape of the grader's reply.
#[derive(Debug, Deserialize)]
struct LlmGrade {
    score: i64,
    feedback: String,
    reasoning: String,
}

/// LLM-graded scorer. Keeps the heuristic breakdown for auditability and
/// degrades to the full heuristic result when the chat call fails.
pub struct LlmScorer {
    chat: ChatClient,
}

impl LlmScorer {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl AnswerScorer for LlmScorer {
    async fn score(
        &self,
        question: &str,
        answer: &str,
        resume_text: &str,
    ) -> Result<ScoreResult, AppError> {
        let heuristic = score_answer(question, answer, resume_text);

        let prompt = GRADE_PROMPT_TEMPLATE
            .replace("{question}", question)
            .replace("{answer}", answer);
        let messages = [ChatMessage::system(GRADER_SYSTEM), ChatMessage::user(prompt)];

        match self.chat.complete_json::<LlmGrade>(&messages, 0.2, 512).await {
            Ok(grade) => Ok(ScoreResult {
                score: grade.score.clamp(0, MAX_SCORE as i64) as u32,
                feedback: grade.feedback,
                reasoning: grade.reasoning,
                breakdown: heuristic.breakdown,
            }),
            Err(e) => {
                warn!("LLM grading failed, using heuristic score: {e}");
                Ok(heuristic)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core heuristic algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Scores an answer with a transparent breakdown. Never panics for any
/// string input; the question text deliberately plays no part — only answer
/// length gates the short-circuit path.
pub fn score_answer(_question: &str, answer: &str, resume_text: &str) -> ScoreResult {
    if answer.trim().chars().count() < MIN_ANSWER_CHARS {
        return ScoreResult {
            score: 5,
            feedback: "Answer too brief".to_string(),
            reasoning: "Insufficient content".to_string(),
            breakdown: ScoreBreakdown {
                depth: 1,
                clarity: 1,
                relevance: 1,
            },
        };
    }

    let answer_lower = answer.to_lowercase();

    let depth = (DEPTH_KEYWORDS
        .iter()
        .filter(|kw| answer_lower.contains(*kw))
        .count() as u32
        * 2)
        .min(MAX_DEPTH);

    let clarity = (answer
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .count() as u32)
        .min(MAX_CLARITY);

    let resume_lower = resume_text.to_lowercase();
    let resume_words: HashSet<&str> = resume_lower.split_whitespace().collect();
    let answer_words: HashSet<&str> = answer_lower.split_whitespace().collect();
    let overlap = resume_words.intersection(&answer_words).count() as u32;
    let relevance = (overlap / 10).min(MAX_RELEVANCE);

    let score = (BASE_SCORE + depth + clarity + relevance).min(MAX_SCORE);

    let feedback = if score >= 18 {
        "Excellent"
    } else if score >= 14 {
        "Good"
    } else {
        "Needs improvement"
    };

    ScoreResult {
        score,
        feedback: feedback.to_string(),
        reasoning: format!(
            "Depth: {depth}/{MAX_DEPTH} | Clarity: {clarity}/{MAX_CLARITY} | \
             Relevance: {relevance}/{MAX_RELEVANCE}"
        ),
        breakdown: ScoreBreakdown {
            depth,
            clarity,
            relevance,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
