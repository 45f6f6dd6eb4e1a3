use serde_json::{Map, Value};

use crate::db::models::staff::Staff;
use crate::db::models::student::Student;
use crate::db::models::user::Role;
use crate::db::DbPool;

pub async fn find_staff(db: &DbPool, id: &str) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as::<_, Staff>(
        "SELECT id, name, email, department, designation, phone, created_at, updated_at
         FROM staff WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_student(db: &DbPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, name, email, enrollment_no, department, semester, phone,
                student_details_id, created_at, updated_at
         FROM students WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Field map of whichever profile row backs a user of `role`.
/// ADMIN users and dangling profile ids yield `None`.
pub async fn profile_fields(
    db: &DbPool,
    role: Role,
    profile_id: &str,
) -> Result<Option<Map<String, Value>>, sqlx::Error> {
    let fields = match role {
        Role::Staff | Role::Faculty => find_staff(db, profile_id).await?.map(|s| s.profile_fields()),
        Role::Student => find_student(db, profile_id).await?.map(|s| s.profile_fields()),
        Role::Admin => None,
    };
    Ok(fields)
}
