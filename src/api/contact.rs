use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;
use bizbuddy_backend::models::{ContactMessage, ContactRequest};
use bizbuddy_backend::utils::validate_contact;

/// POST /api/contact - submit a contact form message
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), (StatusCode, Json<Value>)> {
    let errors = validate_contact(&req.name, &req.email, &req.subject, &req.message);
    if !errors.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "Validation failed", "detail": errors})),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO contacts (name, email, subject, message, is_read, created_at) VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.subject)
    .bind(&req.message)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store contact message: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    tracing::info!(name = %req.name, email = %req.email, "New contact message");

    Ok((
        StatusCode::CREATED,
        Json(ContactMessage {
            id: result.last_insert_rowid(),
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
            is_read: false,
            created_at: now,
        }),
    ))
}

/// GET /api/contact/messages - list all messages, newest first.
/// No auth gate and no pagination; known limitation at inbox scale.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let messages: Vec<ContactMessage> =
        sqlx::query_as("SELECT * FROM contacts ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list contact messages: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;

    let total = messages.len();
    Ok(Json(json!({ "messages": messages, "total": total })))
}
