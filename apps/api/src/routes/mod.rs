pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interviews", post(handlers::handle_start))
        .route("/api/v1/interviews/:id", get(handlers::handle_status))
        .route(
            "/api/v1/interviews/:id/question",
            post(handlers::handle_question),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_answer),
        )
        .route("/api/v1/interviews/:id/stats", get(handlers::handle_stats))
        .route(
            "/api/v1/interviews/:id/report",
            get(handlers::handle_report),
        )
        .with_state(state)
}
