//! The `{status, message, data}` envelope every endpoint answers with.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success body. `data` is always present, `null` for data-less results.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

/// Error body: no `data` key at all.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
}

/// A handler result carrying its own HTTP status.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn success<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> ApiResponse<T> {
    ApiResponse {
        status,
        body: Envelope {
            status: status.as_u16(),
            message: message.into(),
            data,
        },
    }
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorEnvelope {
        status: status.as_u16(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

pub fn failure(message: impl Into<String>) -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
