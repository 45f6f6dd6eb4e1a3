use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::api::middleware::json::JsonBody;
use crate::api::response::{success, ApiResponse};
use crate::api::AppState;
use crate::error::{AppError, AppResult};

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    token: String,
    expires_in: u64,
    role: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = req.email.trim().to_lowercase();

    let row: Option<(String, String, String)> = sqlx::query_as(
        "SELECT profile_id, password, role FROM users WHERE lower(email) = ?"
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    let (profile_id, password_hash, role) = row.ok_or(AppError::AuthFailed)?;

    if !crate::auth::password::verify(&req.password, &password_hash) {
        tracing::warn!("Failed login for {}", email);
        return Err(AppError::AuthFailed);
    }

    let token = crate::auth::jwt::generate(
        &profile_id,
        &email,
        &role,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(success(
        StatusCode::OK,
        LoginResponse {
            token,
            expires_in: state.jwt_expiry_hours * 3600,
            role,
        },
        "Logged in successfully",
    ))
}

pub async fn logout() -> ApiResponse<()> {
    // JWT is stateless; client just discards the token.
    success(StatusCode::OK, (), "Logged out successfully")
}
