use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned whenever an email does not resolve to a candidate.
pub const CANDIDATE_NOT_FOUND: &str = "Candidato no encontrado";

/// Message returned when create is missing firstName, lastName or email.
pub const MISSING_REQUIRED_FIELDS: &str = "Faltan campos obligatorios";

/// Message returned when a request body cannot be decoded.
pub const MALFORMED_BODY: &str = "Datos del candidato no válidos";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File type error: {0}")]
    FileType(String),

    /// A persistence failure. `message` is what the client sees; `source`
    /// is only logged.
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn candidate_not_found() -> Self {
        AppError::NotFound(CANDIDATE_NOT_FOUND.to_string())
    }

    /// Builds a `map_err` adapter that tags a store failure with the
    /// client-facing message of the operation it interrupted.
    pub fn store(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Store { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::FileType(msg) => (StatusCode::BAD_REQUEST, "FILE_TYPE_ERROR", msg.clone()),
            AppError::Store { message, source } => {
                tracing::error!("Store error ({message}): {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    message.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
