use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqliteConnection;
use std::sync::Arc;

use crate::api::middleware::json::JsonBody;
use crate::api::response::{success, ApiResponse};
use crate::api::AppState;
use crate::db::models::student::{Student, StudentDetails, StudentProfile, UpdateStudentRequest};
use crate::error::{AppError, AppResult};

const SELECT_STUDENT: &str =
    "SELECT id, name, email, enrollment_no, department, semester, phone,
            student_details_id, created_at, updated_at
     FROM students WHERE id = ?";

const SELECT_DETAILS: &str =
    "SELECT id, guardian_name, address, date_of_birth, blood_group, emergency_contact,
            created_at, updated_at
     FROM student_details WHERE id = ?";

/// Fields owned by the registrar; a profile edit may never carry them.
const IMMUTABLE_FIELDS: [(&str, &str); 2] = [
    ("email", "Email cannot be updated"),
    ("enrollmentNo", "Enrollment Number cannot be updated"),
];

async fn load_profile(conn: &mut SqliteConnection, student_id: &str) -> Result<Option<StudentProfile>, sqlx::Error> {
    let Some(student) = sqlx::query_as::<_, Student>(SELECT_STUDENT)
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let details = sqlx::query_as::<_, StudentDetails>(SELECT_DETAILS)
        .bind(&student.student_details_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(Some(StudentProfile { student, details }))
}

/// Reject the body before any field is looked at if it tries to touch an
/// immutable field, then parse the editable remainder.
fn parse_update(body: Value) -> AppResult<UpdateStudentRequest> {
    let Value::Object(fields) = body else {
        return Err(AppError::Validation("Data is required".to_string()));
    };

    for (field, message) in IMMUTABLE_FIELDS {
        if fields.get(field).is_some_and(|v| !v.is_null()) {
            return Err(AppError::Validation(message.to_string()));
        }
    }

    let editable = fields
        .into_iter()
        .filter(|(k, _)| !IMMUTABLE_FIELDS.iter().any(|(field, _)| *field == k.as_str()))
        .collect();

    serde_json::from_value(Value::Object(editable))
        .map_err(|e| AppError::Validation(format!("Invalid profile data: {}", e)))
}

/// `{id}` is a user id; the profile is the student linked to that user.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<StudentProfile>> {
    let not_found = || AppError::NotFound("User profile not found".to_string());

    let (profile_id,): (String,) = sqlx::query_as("SELECT profile_id FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)?;

    let mut conn = state.db.acquire().await?;
    let profile = load_profile(&mut *conn, &profile_id).await?.ok_or_else(not_found)?;

    Ok(success(StatusCode::OK, profile, "Profile fetched successfully"))
}

/// `{id}` is a student id. Details, student row and the linked user's name
/// are written in one transaction.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<ApiResponse<StudentProfile>> {
    let patch = parse_update(body)?;

    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    let mut tx = state.db.begin().await?;

    let (details_id,): (String,) = sqlx::query_as("SELECT student_details_id FROM students WHERE id = ?")
        .bind(&student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let now = Utc::now().to_rfc3339();

    if let Some(details) = &patch.details {
        let result = sqlx::query(
            "UPDATE student_details
             SET guardian_name = COALESCE(?, guardian_name),
                 address = COALESCE(?, address),
                 date_of_birth = COALESCE(?, date_of_birth),
                 blood_group = COALESCE(?, blood_group),
                 emergency_contact = COALESCE(?, emergency_contact),
                 updated_at = ?
             WHERE id = ?"
        )
        .bind(&details.guardian_name)
        .bind(&details.address)
        .bind(&details.date_of_birth)
        .bind(&details.blood_group)
        .bind(&details.emergency_contact)
        .bind(&now)
        .bind(&details_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Student details not found".to_string()));
        }
    }

    let name = patch.name.as_deref().map(str::trim);

    sqlx::query(
        "UPDATE students
         SET name = COALESCE(?, name),
             department = COALESCE(?, department),
             semester = COALESCE(?, semester),
             phone = COALESCE(?, phone),
             updated_at = ?
         WHERE id = ?"
    )
    .bind(name)
    .bind(&patch.department)
    .bind(patch.semester)
    .bind(&patch.phone)
    .bind(&now)
    .bind(&student_id)
    .execute(&mut *tx)
    .await?;

    if let Some(name) = name {
        sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE profile_id = ?")
            .bind(name)
            .bind(&now)
            .bind(&student_id)
            .execute(&mut *tx)
            .await?;
    }

    let profile = load_profile(&mut *tx, &student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))?;

    tx.commit().await?;

    tracing::info!("Student profile {} updated", student_id);
    Ok(success(StatusCode::OK, profile, "Profile updated successfully"))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let mut tx = state.db.begin().await?;

    let (details_id,): (String,) = sqlx::query_as("SELECT student_details_id FROM students WHERE id = ?")
        .bind(&student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(&student_id)
        .execute(&mut *tx)
        .await?;

    // The login goes with the profile it points at.
    sqlx::query("DELETE FROM users WHERE profile_id = ? AND role = 'STUDENT'")
        .bind(&student_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM student_details WHERE id = ?")
        .bind(&details_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Student profile {} deleted", student_id);
    Ok(success(StatusCode::OK, (), "Profile deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_rejected_even_with_valid_fields() {
        let err = parse_update(json!({"name": "Ravi", "email": "new@campus.local"})).unwrap_err();
        assert_eq!(err.to_string(), "Email cannot be updated");
    }

    #[test]
    fn test_enrollment_rejected() {
        let err = parse_update(json!({"enrollmentNo": "EN999"})).unwrap_err();
        assert_eq!(err.to_string(), "Enrollment Number cannot be updated");
    }

    #[test]
    fn test_null_immutable_fields_are_ignored() {
        let patch = parse_update(json!({"email": null, "phone": "555-0101"})).expect("valid");
        assert_eq!(patch.phone.as_deref(), Some("555-0101"));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let err = parse_update(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "Data is required");
    }

    #[test]
    fn test_unknown_field_is_validation_error() {
        let err = parse_update(json!({"hostel": "A"})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
