use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;
use bizbuddy_backend::chat::MatchOutcome;
use bizbuddy_backend::models::ChatRequest;

const FALLBACK_ANSWER: &str =
    "I'm sorry, I couldn't find a suitable answer. Please try rephrasing your question.";

/// POST /chat - answer a business question from the Q&A dataset
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if req.question.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "Question cannot be empty"})),
        ));
    }

    // Degraded mode: index failed to build at startup
    let Some(index) = state.chat.as_ref() else {
        return Ok(Json(json!({ "answer": FALLBACK_ANSWER })));
    };

    let index = index.clone();
    let field = req.field.clone();
    let question = req.question.clone();

    // Encoding is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || index.answer(&field, &question))
        .await
        .map_err(|e| {
            tracing::error!("Chat task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?
        .map_err(|e| {
            tracing::error!("Answer matching failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    match outcome {
        MatchOutcome::Match { answer, confidence } => Ok(Json(json!({
            "user_question": req.question,
            "detected_field": req.field,
            "confidence": confidence,
            "answer": answer,
        }))),
        MatchOutcome::NoMatch => Ok(Json(json!({ "answer": FALLBACK_ANSWER }))),
    }
}
