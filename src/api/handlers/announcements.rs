use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::middleware::auth::AuthUser;
use crate::api::middleware::json::JsonBody;
use crate::api::response::{success, ApiResponse};
use crate::api::AppState;
use crate::db::models::announcement::{
    id_from_value, Announcement, AnnouncementIdRequest, CreateAnnouncementRequest,
    UpdateAnnouncementRequest,
};
use crate::db::models::user::Role;
use crate::db::{notifications, profiles, DbPool};
use crate::error::{AppError, AppResult};

const SELECT_ANNOUNCEMENT: &str =
    "SELECT id, title, message, issuer, role, filter, is_global, created_at, updated_at
     FROM announcements";

fn validate_role(role: Option<&str>) -> AppResult<String> {
    match role.and_then(Role::parse) {
        Some(role) if role.is_announcement_target() => Ok(role.as_str().to_string()),
        _ => Err(AppError::Validation("Missing permission".to_string())),
    }
}

/// Stored filters are JSON objects; `null` means "no filter".
fn validate_filter(filter: Option<Value>) -> AppResult<Option<Json<Value>>> {
    match filter {
        None | Some(Value::Null) => Ok(None),
        Some(obj @ Value::Object(_)) => Ok(Some(Json(obj))),
        Some(_) => Err(AppError::Validation("Filter must be an object".to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn find(db: &DbPool, id: &str) -> Result<Option<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!("{} WHERE id = ?", SELECT_ANNOUNCEMENT))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Resolve the body `id` to an announcement the caller issued.
async fn find_owned(db: &DbPool, id: Option<&Value>, auth: &AuthUser) -> AppResult<Announcement> {
    let id = id_from_value(id)
        .ok_or_else(|| AppError::Validation("Id is required".to_string()))?;

    let announcement = find(db, &id)
        .await?
        .ok_or_else(|| AppError::Validation("Announcement not found".to_string()))?;

    if announcement.issuer != auth.id() {
        return Err(AppError::Validation(
            "This announcement was not issued by you".to_string(),
        ));
    }

    Ok(announcement)
}

/// Announcements visible to the calling staff member.
pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Announcement>>> {
    let viewer = auth.id();

    let profile = profiles::find_staff(&state.db, viewer)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;
    let fields = profile.profile_fields();

    let announcements = sqlx::query_as::<_, Announcement>(
        &format!("{} ORDER BY created_at DESC", SELECT_ANNOUNCEMENT),
    )
    .fetch_all(&state.db)
    .await?;

    let visible: Vec<Announcement> = announcements
        .into_iter()
        .filter(|a| a.is_visible_to(viewer, &fields))
        .collect();

    tracing::debug!("{} announcements visible to {}", visible.len(), viewer);
    Ok(success(StatusCode::OK, visible, "Announcements fetched successfully"))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    JsonBody(body): JsonBody<CreateAnnouncementRequest>,
) -> AppResult<ApiResponse<Announcement>> {
    let (Some(title), Some(message)) = (non_blank(body.title), non_blank(body.message)) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };
    let role = validate_role(body.role.as_deref())?;
    let filter = validate_filter(body.filter)?;

    let now = Utc::now().to_rfc3339();
    let announcement = Announcement {
        id: Uuid::new_v4().to_string(),
        title,
        message,
        issuer: auth.id().to_string(),
        role,
        filter,
        is_global: body.is_global,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO announcements (id, title, message, issuer, role, filter, is_global, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&announcement.id)
    .bind(&announcement.title)
    .bind(&announcement.message)
    .bind(&announcement.issuer)
    .bind(&announcement.role)
    .bind(&announcement.filter)
    .bind(announcement.is_global)
    .bind(&announcement.created_at)
    .bind(&announcement.updated_at)
    .execute(&state.db)
    .await?;

    notifications::spawn_announcement_notifications(state.db.clone(), announcement.clone());
    notifications::spawn_notify(
        state.db.clone(),
        announcement.issuer.clone(),
        "You created a new announcement",
        announcement.title.clone(),
    );

    tracing::info!("Announcement {} created by {}", announcement.id, announcement.issuer);
    Ok(success(StatusCode::CREATED, announcement, "Announcement created successfully"))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    JsonBody(body): JsonBody<UpdateAnnouncementRequest>,
) -> AppResult<ApiResponse<Announcement>> {
    let existing = find_owned(&state.db, body.id.as_ref(), &auth).await?;

    let title = match body.title {
        Some(t) => non_blank(Some(t))
            .ok_or_else(|| AppError::Validation("Missing required fields".to_string()))?,
        None => existing.title,
    };
    let message = match body.message {
        Some(m) => non_blank(Some(m))
            .ok_or_else(|| AppError::Validation("Missing required fields".to_string()))?,
        None => existing.message,
    };
    let role = match body.role {
        Some(r) => validate_role(Some(r.as_str()))?,
        None => existing.role,
    };
    let filter = match body.filter {
        Some(f) => validate_filter(f)?,
        None => existing.filter,
    };
    let is_global = body.is_global.unwrap_or(existing.is_global);
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE announcements
         SET title = ?, message = ?, role = ?, filter = ?, is_global = ?, updated_at = ?
         WHERE id = ?"
    )
    .bind(&title)
    .bind(&message)
    .bind(&role)
    .bind(&filter)
    .bind(is_global)
    .bind(&now)
    .bind(&existing.id)
    .execute(&state.db)
    .await?;

    let updated = Announcement {
        id: existing.id,
        title,
        message,
        issuer: existing.issuer,
        role,
        filter,
        is_global,
        created_at: existing.created_at,
        updated_at: now,
    };

    Ok(success(StatusCode::OK, updated, "Announcement updated successfully"))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    JsonBody(body): JsonBody<AnnouncementIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let existing = find_owned(&state.db, body.id.as_ref(), &auth).await?;

    sqlx::query("DELETE FROM announcements WHERE id = ?")
        .bind(&existing.id)
        .execute(&state.db)
        .await?;

    tracing::info!("Announcement {} deleted by {}", existing.id, auth.id());
    Ok(success(StatusCode::OK, (), "Announcement deleted successfully"))
}
