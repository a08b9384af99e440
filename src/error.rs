//! Handler-boundary errors and their fixed JSON bodies.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::services::{notices::StorageError, notifier::NotifyError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required form field absent (400)
    #[error("missing required field {0}")]
    MissingField(&'static str),

    /// Field present but unparseable (400, same body as a missing one)
    #[error("invalid value for field {0}")]
    InvalidField(&'static str),

    /// Shared secret mismatch. Answered with 200 and a distinct body, not 401/403.
    #[error("api key not valid")]
    InvalidApiKey,

    /// Path id is not an integer (404)
    #[error("unknown notice")]
    UnknownNotice,

    /// Store unreachable or statement failed (500, logged)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Status endpoint did not accept the post (500, logged)
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingField(field) | Self::InvalidField(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Failed", "BadRequest": field }),
            ),
            Self::InvalidApiKey => (StatusCode::OK, json!({ "message": "api key not valid" })),
            Self::UnknownNotice => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Failed", "Error": "NotFound" }),
            ),
            Self::Storage(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Failed", "Error": "CannotSaveToDB" }),
                )
            }
            Self::Notify(e) => {
                tracing::error!("Notify error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Failed", "Error": "CannotTweet" }),
                )
            }
        };

        json_line(status, &body)
    }
}

/// JSON response whose body ends with a newline.
pub fn json_line<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(mut body) => {
            body.push('\n');
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
