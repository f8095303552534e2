use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// Unified error type for every fallible operation in the system. Storage-level
/// integrity violations are converted to their user-facing variants at the
/// repository boundary, so a raw database error never leaks into a client body.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Registration ---
    #[error("email is already registered")]
    DuplicateEmail,

    // --- Login ---
    // Unknown email. The login handler turns this into the generic
    // "incorrect" redirect before it ever reaches IntoResponse.
    #[error("invalid credentials")]
    InvalidCredentials,
    // Known email, wrong password. Kept distinct so the login flow can
    // surface its more specific message.
    #[error("password incorrect")]
    WrongPassword,

    // --- Content ---
    #[error("a post with this title already exists")]
    DuplicateTitle,
    #[error("not found")]
    NotFound,

    // --- Authorization ---
    #[error("forbidden")]
    Forbidden,

    // --- Input ---
    #[error("invalid input: {0}")]
    Validation(String),

    // --- Infrastructure ---
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    /// into_response
    ///
    /// Maps each error variant to its HTTP form. Authorization denials use one
    /// generic body regardless of whether the caller was anonymous or merely
    /// non-admin, and regardless of whether the resource exists. Infrastructure
    /// errors keep their detail in the server log only.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::DuplicateEmail => {
                (StatusCode::CONFLICT, "email is already registered".to_string())
            }
            AppError::DuplicateTitle => (
                StatusCode::CONFLICT,
                "a post with this title already exists".to_string(),
            ),
            AppError::InvalidCredentials | AppError::WrongPassword => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
