//! Handlers for the `/recordings` resource: raw hum uploads.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use humlab_core::error::CoreError;
use humlab_core::types::DbId;
use humlab_db::models::recording::{CreateRecording, UploadedRecording};
use humlab_db::repositories::RecordingRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Blob store folder for raw uploads.
pub const RECORDINGS_FOLDER: &str = "recordings";

/// Multipart field name carrying the audio bytes.
const AUDIO_FIELD: &str = "audio";

/// POST /api/v1/recordings
///
/// Multipart upload of a raw hum. The audio is stored in the blob store
/// first, then referenced by a new `uploaded_recordings` row. Returns 201.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedRecording>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let original_filename = field.file_name().unwrap_or("recording").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded audio is empty".to_string()));
        }

        let object = state.blob_store.upload(&bytes, RECORDINGS_FOLDER).await?;
        let recording = RecordingRepo::insert(
            &state.pool,
            &CreateRecording {
                blob_key: object.key,
                blob_url: object.url,
                original_filename,
            },
        )
        .await?;

        tracing::info!(
            recording_id = recording.id,
            blob_key = %recording.blob_key,
            "Recording uploaded"
        );
        return Ok((StatusCode::CREATED, Json(DataResponse { data: recording })));
    }

    Err(AppError::BadRequest(format!(
        "Multipart body must contain an '{AUDIO_FIELD}' field"
    )))
}

/// GET /api/v1/recordings
///
/// List uploaded recordings, newest first.
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UploadedRecording>>>> {
    let recordings = RecordingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: recordings }))
}

/// GET /api/v1/recordings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UploadedRecording>>> {
    let recording = RecordingRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "UploadedRecording",
            id,
        }))?;
    Ok(Json(DataResponse { data: recording }))
}

/// DELETE /api/v1/recordings/{id}
///
/// Deletes the blob object best-effort, then the row. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let recording = RecordingRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "UploadedRecording",
            id,
        }))?;

    if let Err(e) = state.blob_store.delete(&recording.blob_key).await {
        tracing::warn!(
            recording_id = id,
            blob_key = %recording.blob_key,
            error = %e,
            "Failed to delete recording blob; removing row anyway"
        );
    }
    RecordingRepo::delete(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
