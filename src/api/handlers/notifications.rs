use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::middleware::auth::AuthUser;
use crate::api::middleware::json::JsonBody;
use crate::api::response::{success, ApiResponse};
use crate::api::AppState;
use crate::db::models::announcement::id_from_value;
use crate::db::models::notification::Notification;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub id: Option<Value>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Notification>>> {
    let rows = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, title, message, is_read, created_at
         FROM notifications WHERE user_id = ? ORDER BY created_at DESC"
    )
    .bind(auth.id())
    .fetch_all(&state.db)
    .await?;

    Ok(success(StatusCode::OK, rows, "Notifications fetched successfully"))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    JsonBody(body): JsonBody<MarkReadRequest>,
) -> AppResult<ApiResponse<()>> {
    let id = id_from_value(body.id.as_ref())
        .ok_or_else(|| AppError::Validation("Id is required".to_string()))?;

    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(auth.id())
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(success(StatusCode::OK, (), "Notification marked as read"))
}
