use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::StoredFile;

/// POST /api/upload
///
/// Expects a multipart form with a single `file` field.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoredFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let stored = state.uploads.save(&file_name, &content_type, data).await?;
        return Ok(Json(stored));
    }

    Err(AppError::Validation("No se ha enviado ningún archivo".to_string()))
}
