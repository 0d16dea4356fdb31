use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;
use bizbuddy_backend::auth::{hash_password, issue_token, verify_password, verify_token};
use bizbuddy_backend::models::{LoginRequest, LoginResponse, RegisterRequest, User, UserInfo};
use bizbuddy_backend::utils::validate_registration;

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), (StatusCode, Json<Value>)> {
    let errors = validate_registration(&req.username, &req.email, &req.password);
    if !errors.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "Validation failed", "detail": errors})),
        ));
    }

    let existing_user: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(&req.username)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?;

    if existing_user.is_some() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Username already registered"})),
        ));
    }

    let existing_email: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?;

    if existing_email.is_some() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email already registered"})),
        ));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create user"})),
        )
    })?;

    tracing::info!(username = %req.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            id: result.last_insert_rowid(),
            username: req.username,
            email: req.email,
            created_at: now,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    // Single generic message for both unknown email and wrong password
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
    };

    let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(unauthorized)?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    if !valid {
        return Err(unauthorized());
    }

    let access_token = issue_token(
        &state.config.auth.token_secret,
        &user.username,
        state.config.auth.token_ttl_minutes,
    )
    .map_err(|e| {
        tracing::error!("Token issuance failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MeQuery {
    pub token: String,
}

/// GET /api/auth/me?token=...
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MeQuery>,
) -> Result<Json<UserInfo>, (StatusCode, Json<Value>)> {
    let username = verify_token(&state.config.auth.token_secret, &query.token).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid or expired token"})),
        )
    })?;

    // The token only asserts the claim; the user may have vanished since issue
    let user: User = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "User not found"})),
            )
        })?;

    Ok(Json(user.into()))
}

fn internal_error(e: sqlx::Error) -> (StatusCode, Json<Value>) {
    tracing::error!("Database error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Server error"})),
    )
}
