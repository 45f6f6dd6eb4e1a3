//! Shared fixtures for the HTTP integration tests.
//!
//! Every test gets its own in-memory SQLite database with all migrations
//! applied, and drives the router directly through `oneshot` without binding
//! a port.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt; // for .collect()
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

use campus_api::api::{build_app, AppState};
use campus_api::db::models::user::{Role, User};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-campus-integration-tests";
const NOW: &str = "2026-01-01T00:00:00+00:00";

/// In-memory SQLite pool. A single connection keeps every query on the same
/// in-memory database.
pub async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    campus_api::db::migrate(&pool).await.expect("Migration failed");
    pool
}

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let state = Arc::new(AppState {
            db,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
        });
        let app = build_app(state.clone(), tower_http::cors::CorsLayer::new());
        Self { app, state }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn token(&self, profile_id: &str, role: Role) -> String {
        campus_api::auth::jwt::generate(
            profile_id,
            &format!("{}@campus.local", profile_id),
            role.as_str(),
            &self.state.jwt_secret,
            1,
        )
        .expect("Should generate token")
    }

    /// Send a request and return the status plus parsed JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        (status, body_json(resp.into_body()).await)
    }
}

/// Read a response body as JSON.
pub async fn body_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

pub async fn insert_department(db: &SqlitePool, name: &str) {
    sqlx::query("INSERT INTO departments (id, department, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(NOW)
        .bind(NOW)
        .execute(db)
        .await
        .expect("Failed to seed department");
}

/// Seed a staff (or faculty) profile plus its login. Returns the user id.
pub async fn insert_staff(db: &SqlitePool, id: &str, role: Role, department: &str, designation: &str) -> String {
    let email = format!("{}@campus.local", id);
    sqlx::query(
        "INSERT INTO staff (id, name, email, department, designation, phone, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, NULL, ?, ?)"
    )
    .bind(id)
    .bind(format!("Staff {}", id))
    .bind(&email)
    .bind(department)
    .bind(designation)
    .bind(NOW)
    .bind(NOW)
    .execute(db)
    .await
    .expect("Failed to seed staff");

    insert_user(db, id, &format!("Staff {}", id), &email, role).await
}

/// Seed a student, its details row and its login. Returns the user id.
pub async fn insert_student(db: &SqlitePool, id: &str, department: &str, semester: i64) -> String {
    let details_id = format!("{}-details", id);
    sqlx::query(
        "INSERT INTO student_details (id, guardian_name, address, date_of_birth, blood_group, emergency_contact, created_at, updated_at)
         VALUES (?, 'Guardian', '12 Park Road', '2004-05-06', 'B+', '555-0000', ?, ?)"
    )
    .bind(&details_id)
    .bind(NOW)
    .bind(NOW)
    .execute(db)
    .await
    .expect("Failed to seed student details");

    let email = format!("{}@campus.local", id);
    sqlx::query(
        "INSERT INTO students (id, name, email, enrollment_no, department, semester, phone, student_details_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)"
    )
    .bind(id)
    .bind(format!("Student {}", id))
    .bind(&email)
    .bind(format!("EN-{}", id))
    .bind(department)
    .bind(semester)
    .bind(&details_id)
    .bind(NOW)
    .bind(NOW)
    .execute(db)
    .await
    .expect("Failed to seed student");

    insert_user(db, id, &format!("Student {}", id), &email, Role::Student).await
}

async fn insert_user(db: &SqlitePool, profile_id: &str, name: &str, email: &str, role: Role) -> String {
    let password = campus_api::auth::password::hash("password123").expect("Failed to hash password");
    let user = User::new(profile_id.to_string(), name.to_string(), email.to_string(), password, role);
    campus_api::db::insert_user(db, &user).await.expect("Failed to seed user");
    user.id
}
