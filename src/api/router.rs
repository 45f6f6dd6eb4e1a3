use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use super::AppState;
use super::handlers;
use super::response;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health (public)
        .route("/health", get(handlers::health::health_check))
        // Auth (public)
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Departments (admin console)
        .route(
            "/api/admin/department",
            get(handlers::departments::list).post(handlers::departments::create),
        )
        .route(
            "/api/admin/department/{id}",
            get(handlers::departments::get)
                .put(handlers::departments::update)
                .delete(handlers::departments::delete),
        )
        // Staff announcements (token required)
        .route(
            "/api/staff/announcements",
            get(handlers::announcements::list)
                .post(handlers::announcements::create)
                .patch(handlers::announcements::update)
                .delete(handlers::announcements::delete),
        )
        // Student profile
        .route(
            "/api/student/profile/{id}",
            get(handlers::student_profile::get)
                .patch(handlers::student_profile::update)
                .delete(handlers::student_profile::delete),
        )
        // Notifications (token required)
        .route(
            "/api/notifications",
            get(handlers::notifications::list).patch(handlers::notifications::mark_read),
        )
        .fallback(|| async {
            response::error(axum::http::StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
}
