use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::middleware::json::JsonBody;
use crate::api::response::{success, ApiResponse};
use crate::api::AppState;
use crate::db::models::department::{Department, DepartmentRequest};
use crate::db::{is_unique_violation, DbPool};
use crate::error::{AppError, AppResult};

async fn find_by_name(db: &DbPool, name: &str) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, department, created_at, updated_at FROM departments WHERE department = ?"
    )
    .bind(name)
    .fetch_optional(db)
    .await
}

fn not_found() -> AppError {
    AppError::NotFound("Department not found".to_string())
}

fn duplicate() -> AppError {
    AppError::Validation("Department already exists".to_string())
}

fn required_name(body: &DepartmentRequest) -> AppResult<String> {
    body.name()
        .ok_or_else(|| AppError::Validation("Department name is required".to_string()))
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<ApiResponse<Vec<Department>>> {
    let rows = sqlx::query_as::<_, Department>(
        "SELECT id, department, created_at, updated_at FROM departments ORDER BY department ASC"
    )
    .fetch_all(&state.db)
    .await?;

    Ok(success(StatusCode::OK, rows, "Departments fetched successfully"))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<DepartmentRequest>,
) -> AppResult<ApiResponse<Department>> {
    let name = required_name(&body)?;

    if find_by_name(&state.db, &name).await?.is_some() {
        return Err(duplicate());
    }

    let now = Utc::now().to_rfc3339();
    let department = Department {
        id: Uuid::new_v4().to_string(),
        department: name,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO departments (id, department, created_at, updated_at) VALUES (?, ?, ?, ?)"
    )
    .bind(&department.id)
    .bind(&department.department)
    .bind(&department.created_at)
    .bind(&department.updated_at)
    .execute(&state.db)
    .await
    .map_err(|e| if is_unique_violation(&e) { duplicate() } else { e.into() })?;

    tracing::info!("Department '{}' created", department.department);
    Ok(success(StatusCode::CREATED, department, "Department created successfully"))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<ApiResponse<Department>> {
    let department = find_by_name(&state.db, &name).await?.ok_or_else(not_found)?;
    Ok(success(StatusCode::OK, department, "Department fetched successfully"))
}

/// Rename a department. `{id}` is the current name.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(current): Path<String>,
    JsonBody(body): JsonBody<DepartmentRequest>,
) -> AppResult<ApiResponse<Department>> {
    let name = required_name(&body)?;

    if let Some(existing) = find_by_name(&state.db, &name).await? {
        if existing.department != current {
            return Err(duplicate());
        }
    }

    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE departments SET department = ?, updated_at = ? WHERE department = ?"
    )
    .bind(&name)
    .bind(&now)
    .bind(&current)
    .execute(&state.db)
    .await
    .map_err(|e| if is_unique_violation(&e) { duplicate() } else { e.into() })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    let department = find_by_name(&state.db, &name).await?.ok_or_else(not_found)?;
    tracing::info!("Department '{}' renamed to '{}'", current, name);
    Ok(success(StatusCode::OK, department, "Department updated successfully"))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM departments WHERE department = ?")
        .bind(&name)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    tracing::info!("Department '{}' deleted", name);
    Ok(success(StatusCode::OK, (), "Department deleted successfully"))
}
