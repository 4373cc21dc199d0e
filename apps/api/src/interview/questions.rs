//! Question sources — pluggable origin for interview questions.
//!
//! `LlmQuestionSource` asks the chat model for a question grounded in the
//! candidate's resume; `StaticQuestionSource` serves a fixed ML question bank
//! with no external calls (demo mode). Selected once at startup, so callers
//! never branch on LLM availability.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::interview::session::Exchange;
use crate::llm_client::prompts::{INTERVIEWER_SYSTEM, QUESTION_PROMPT_TEMPLATE};
use crate::llm_client::{ChatClient, ChatMessage};

/// Fixed ML/AI question bank used in demo mode and as the fallback when a
/// live question call fails mid-interview.
const QUESTION_BANK: &[&str] = &[
    "Explain L1 vs L2 regularization. When would you prefer each?",
    "How does transfer learning work in CNNs, and when does it help?",
    "Walk me through backpropagation. What is actually being computed?",
    "What is overfitting, how do you detect it, and how do you fix it?",
    "Compare GANs and VAEs for generative modeling. What are the tradeoffs?",
];

/// Produces the next interview question for a session.
///
/// Carried in `AppState` as `Arc<dyn QuestionSource>`.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// `number` is 1-based; `previous` holds the answered exchanges so far.
    async fn next_question(
        &self,
        role: &str,
        skills: &[String],
        number: u32,
        previous: &[Exchange],
    ) -> Result<String, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// StaticQuestionSource — fixed bank, no external calls
// ────────────────────────────────────────────────────────────────────────────

pub struct StaticQuestionSource;

impl StaticQuestionSource {
    /// 1-based lookup into the bank, wrapping past the end.
    pub fn question_for(number: u32) -> String {
        let idx = (number.max(1) as usize - 1) % QUESTION_BANK.len();
        QUESTION_BANK[idx].to_string()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn next_question(
        &self,
        _role: &str,
        _skills: &[String],
        number: u32,
        _previous: &[Exchange],
    ) -> Result<String, AppError> {
        Ok(Self::question_for(number))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmQuestionSource — live chat-completion calls
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionSource {
    chat: ChatClient,
}

impl LlmQuestionSource {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    async fn next_question(
        &self,
        role: &str,
        skills: &[String],
        number: u32,
        previous: &[Exchange],
    ) -> Result<String, AppError> {
        let prompt = QUESTION_PROMPT_TEMPLATE
            .replace("{role}", role)
            .replace("{skills}", &skills.join(", "))
            .replace("{number}", &number.to_string());

        // Prior Q/A turns go in as real conversation history so the model
        // can avoid repeating itself and follow up on weak answers.
        let mut messages = vec![ChatMessage::system(INTERVIEWER_SYSTEM)];
        for exchange in previous {
            messages.push(ChatMessage::assistant(exchange.question.clone()));
            messages.push(ChatMessage::user(exchange.answer.clone()));
        }
        messages.push(ChatMessage::user(prompt));

        let question = self
            .chat
            .complete(&messages, 0.7, 256)
            .await
            .map_err(|e| AppError::Chat(format!("question generation failed: {e}")))?;

        Ok(question.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_serves_bank_in_order() {
        let source = StaticQuestionSource;
        let q1 = source
            .next_question("ML Engineer", &[], 1, &[])
            .await
            .unwrap();
        let q2 = source
            .next_question("ML Engineer", &[], 2, &[])
            .await
            .unwrap();
        assert!(q1.contains("L1 vs L2"));
        assert!(q2.contains("transfer learning"));
        assert_ne!(q1, q2);
    }

    #[test]
    fn test_static_source_wraps_past_bank_end() {
        assert_eq!(
            StaticQuestionSource::question_for(6),
            StaticQuestionSource::question_for(1)
        );
    }

    #[test]
    fn test_static_source_handles_zero_gracefully() {
        assert_eq!(
            StaticQuestionSource::question_for(0),
            StaticQuestionSource::question_for(1)
        );
    }
}
