use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::candidates::validation::{CreateCandidateRequest, UpdateCandidateRequest};
use crate::errors::{AppError, MALFORMED_BODY};
use crate::models::candidate::Candidate;
use crate::state::AppState;

/// Unwraps a JSON body, reporting malformed payloads as validation errors.
/// The decoder's own message is only logged.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        AppError::Validation(MALFORMED_BODY.to_string())
    })
}

/// POST /api/candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    payload: Result<Json<CreateCandidateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let new = json_body(payload)?.validate()?;
    let created = state.store.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/candidates/:email
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = state.store.find_by_email(&email).await?;
    Ok(Json(candidate))
}

/// PUT /api/candidates/:email
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(email): Path<String>,
    payload: Result<Json<UpdateCandidateRequest>, JsonRejection>,
) -> Result<Json<Candidate>, AppError> {
    let update = json_body(payload)?.validate()?;
    let updated = state.store.replace_by_email(&email, update).await?;
    Ok(Json(updated))
}

/// DELETE /api/candidates/:email
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let deleted = state.store.delete_by_email(&email).await?;
    Ok(Json(deleted))
}
