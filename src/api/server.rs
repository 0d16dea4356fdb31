use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET / - health and feature summary
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "BizBuddy API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
        "chatbot_ready": state.chat.is_some(),
        "features": ["authentication", "chatbot", "contact_form"],
        "endpoints": [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/contact",
            "/api/contact/messages",
            "/chat"
        ]
    }))
}
