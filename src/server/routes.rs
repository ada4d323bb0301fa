//! API routes for fraudsight
//!
//! The chat endpoint always answers HTTP 200: failures are encoded in the
//! answer text, not the status code. Malformed request bodies are rejected
//! by the Json extractor before reaching the orchestrator.

use crate::orchestrator::{FeedbackOutcome, FEEDBACK_STORED, NO_HISTORY};
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

type AppStateArc = Arc<AppState>;

/// Chat-turn request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Client-generated session identifier
    pub session_id: String,
    /// The user's message for this turn
    pub user_input: String,
}

/// Chat-turn response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The synthesized final answer (or the fixed fallback text)
    pub ai_answer: String,
}

/// Feedback request body
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Session whose latest turn receives the feedback
    pub session_id: String,
    /// 0 means bad, 1 means good
    pub feedback_good_or_not: u8,
    /// Free-text comment
    pub feedback_text: String,
}

/// Routes for the chatbot surface
pub fn chatbot_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(root))
        .route("/chatbot/ai-assistant", post(ai_assistant))
        .route("/chatbot/feedback-user", post(feedback_user))
}

/// Liveness probe
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello World" }))
}

/// One conversation turn
async fn ai_assistant(
    State(state): State<AppStateArc>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let ai_answer = state
        .orchestrator
        .handle_turn(&request.session_id, &request.user_input)
        .await;

    Json(ChatResponse { ai_answer })
}

/// Attach feedback to the latest turn of a session
async fn feedback_user(
    State(state): State<AppStateArc>,
    Json(request): Json<FeedbackRequest>,
) -> Result<String, (StatusCode, String)> {
    let outcome = state
        .orchestrator
        .record_feedback(
            &request.session_id,
            request.feedback_good_or_not,
            &request.feedback_text,
        )
        .await
        .map_err(|e| {
            error!(
                session_id = %request.session_id,
                error = ?e,
                "Feedback submission failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(match outcome {
        FeedbackOutcome::Stored => FEEDBACK_STORED.to_string(),
        FeedbackOutcome::NoHistory => NO_HISTORY.to_string(),
    })
}
