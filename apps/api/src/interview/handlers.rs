//! Axum route handlers for the Interview API.

use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::questions::StaticQuestionSource;
use crate::interview::scoring::{ScoreBreakdown, ScoreResult};
use crate::interview::session::{Exchange, InterviewSession, MAX_QUESTIONS};
use crate::metrics::CallMetric;
use crate::report::render_report;
use crate::resume;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub candidate: String,
    pub role: String,
    pub skills: Vec<String>,
    pub question: Option<String>,
    pub question_number: u32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub question_number: u32,
    pub score: u32,
    pub feedback: String,
    pub reasoning: String,
    pub breakdown: ScoreBreakdown,
    pub total_score: u32,
    pub interview_complete: bool,
    pub next_question: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: Option<String>,
    pub question_number: u32,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub candidate: String,
    pub role: String,
    pub skills: Vec<String>,
    pub answered: u32,
    pub max_questions: u32,
    pub total_score: u32,
    pub interview_complete: bool,
    pub pending_question: Option<String>,
    pub transcript: Vec<Exchange>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Multipart form: `name`, `role`, `resume` (PDF). Extracts resume text,
/// detects skills, creates the session, and issues the first question.
pub async fn handle_start(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StartResponse>, AppError> {
    let mut name: Option<String> = None;
    let mut role: Option<String> = None;
    let mut resume_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("could not read 'name': {e}"))
                })?)
            }
            "role" => {
                role = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("could not read 'role': {e}"))
                })?)
            }
            "resume" => {
                resume_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            AppError::Validation(format!("could not read 'resume': {e}"))
                        })?
                        .to_vec(),
                )
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'name' is required".to_string()))?;
    let role = role
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'role' is required".to_string()))?;
    let resume_bytes = resume_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("'resume' PDF is required".to_string()))?;

    let resume_text = resume::extract_text(&resume_bytes)?;
    let skills = resume::extract_skills(&resume_text);
    info!("resume analyzed: {} skills detected", skills.len());

    let mut session = InterviewSession::new(
        name.trim().to_string(),
        role.trim().to_string(),
        resume_text,
        skills.clone(),
        &state.config,
    );

    let (question, note) = fetch_next_question(&state, &mut session).await;
    session.pending_question = question.clone();

    let session_id = session.id;
    info!("interview started: session {session_id}");

    state.sessions.lock().await.insert(session_id, session);

    Ok(Json(StartResponse {
        session_id,
        candidate: name.trim().to_string(),
        role: role.trim().to_string(),
        skills,
        question,
        question_number: 1,
        note,
    }))
}

/// POST /api/v1/interviews/:id/answers
///
/// Scores the submitted answer against the pending question, records the
/// exchange, and issues the next question (or completes the interview).
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("no session {id}")))?;

    if session.is_complete() {
        return Err(AppError::Validation(
            "interview is already complete".to_string(),
        ));
    }

    let question = session.pending_question.clone().ok_or_else(|| {
        AppError::Validation(
            "no pending question — request one via POST .../question".to_string(),
        )
    })?;

    // A scorer failure must never abort the session: degrade to the
    // zero-score fallback.
    let result: ScoreResult = match state
        .scorer
        .score(&question, &request.answer, &session.resume_text)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("scoring failed: {e}");
            ScoreResult::error_fallback()
        }
    };

    let question_number = session.next_question_number();
    session.record_exchange(Exchange {
        question,
        answer: request.answer.clone(),
        score: result.score,
        feedback: result.feedback.clone(),
        reasoning: result.reasoning.clone(),
        breakdown: result.breakdown.clone(),
    });

    let (next_question, note) = if session.next_question_number() <= MAX_QUESTIONS {
        let (q, note) = fetch_next_question(&state, session).await;
        session.pending_question = q.clone();
        (q, note)
    } else {
        (None, None)
    };

    Ok(Json(AnswerResponse {
        question_number,
        score: result.score,
        feedback: result.feedback,
        reasoning: result.reasoning,
        breakdown: result.breakdown,
        total_score: session.total_score,
        interview_complete: session.is_complete(),
        next_question,
        note,
    }))
}

/// POST /api/v1/interviews/:id/question
///
/// Returns the pending question, fetching one first if an earlier attempt
/// was rate-limited. Idempotent while a question is pending.
pub async fn handle_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("no session {id}")))?;

    if session.is_complete() {
        return Err(AppError::Validation(
            "interview is already complete".to_string(),
        ));
    }

    let number = session.next_question_number();

    let mut note = None;
    if session.pending_question.is_none() {
        let (q, n) = fetch_next_question(&state, session).await;
        session.pending_question = q;
        note = n;
    }

    Ok(Json(QuestionResponse {
        question: session.pending_question.clone(),
        question_number: number,
        note,
    }))
}

/// GET /api/v1/interviews/:id
///
/// Session status and full transcript.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no session {id}")))?;

    Ok(Json(SessionStatusResponse {
        session_id: session.id,
        candidate: session.candidate.clone(),
        role: session.role.clone(),
        skills: session.skills.clone(),
        answered: session.transcript.len() as u32,
        max_questions: MAX_QUESTIONS,
        total_score: session.total_score,
        interview_complete: session.is_complete(),
        pending_question: session.pending_question.clone(),
        transcript: session.transcript.clone(),
    }))
}

/// GET /api/v1/interviews/:id/stats
///
/// Cache, rate-limiter, and call-metric statistics for the session.
pub async fn handle_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no session {id}")))?;

    let metrics = state.metrics.lock().await.stats();

    Ok(Json(serde_json::json!({
        "cache": session.cache.stats(),
        "rate_limiter": session.limiter.status(),
        "metrics": metrics,
    })))
}

/// GET /api/v1/interviews/:id/report
///
/// Renders the interview transcript as a PDF download.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no session {id}")))?;

    if session.transcript.is_empty() {
        return Err(AppError::Validation(
            "no answers recorded yet — nothing to report".to_string(),
        ));
    }

    let (pdf_bytes, filename) = render_report(session)?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, pdf_bytes))
}

// ────────────────────────────────────────────────────────────────────────────
// Question fetch — limiter → cache → external call
// ────────────────────────────────────────────────────────────────────────────

/// Fetches the next question for a session, running the admission pipeline:
/// rate limiter first, then the cache, then the configured question source.
/// Denials and call failures degrade to a note or a standard question —
/// never an aborted session.
async fn fetch_next_question(
    state: &AppState,
    session: &mut InterviewSession,
) -> (Option<String>, Option<String>) {
    let number = session.next_question_number();
    if number > MAX_QUESTIONS {
        return (None, None);
    }

    if !session.limiter.is_allowed() {
        state
            .metrics
            .lock()
            .await
            .record(CallMetric::new("question_source", "rate_limited", 0));
        if session.limiter.status().is_open {
            // Breaker open: upstream is known-bad, serve the bank until the
            // cooldown elapses.
            return (
                Some(StaticQuestionSource::question_for(number)),
                Some("Live interviewer unavailable — using a standard question.".to_string()),
            );
        }
        return (
            None,
            Some("Rate limit reached — request the question again shortly.".to_string()),
        );
    }

    let number_str = number.to_string();
    let skills_joined = session.skills.join(",");
    let key_parts = [
        "question",
        session.role.as_str(),
        skills_joined.as_str(),
        number_str.as_str(),
    ];

    if let Some(cached) = session.cache.get(&key_parts) {
        state
            .metrics
            .lock()
            .await
            .record(CallMetric::new("question_source", "cache_hit", 0));
        return (Some(cached), None);
    }

    let started = Instant::now();
    match state
        .questions
        .next_question(&session.role, &session.skills, number, &session.transcript)
        .await
    {
        Ok(question) => {
            state.metrics.lock().await.record(CallMetric::new(
                "question_source",
                "success",
                started.elapsed().as_millis() as u64,
            ));
            // A good call closes the breaker.
            session.limiter.reset();
            session.cache.set(question.clone(), &key_parts);
            (Some(question), None)
        }
        Err(e) => {
            warn!("question source failed, serving standard question: {e}");
            session.limiter.trip();
            state.metrics.lock().await.record(CallMetric::new(
                "question_source",
                "error",
                started.elapsed().as_millis() as u64,
            ));
            (
                Some(StaticQuestionSource::question_for(number)),
                Some("Live interviewer unavailable — using a standard question.".to_string()),
            )
        }
    }
}
