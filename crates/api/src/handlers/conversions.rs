//! Handlers for the `/conversions` resource: note sequences rendered into
//! audio artifacts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use humlab_core::error::CoreError;
use humlab_core::note::NoteInput;
use humlab_core::types::DbId;
use humlab_db::models::converted::ConvertedArtifact;
use humlab_db::repositories::ConvertedRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the convert endpoint.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub notes: Vec<NoteInput>,
    pub instrument: String,
}

/// POST /api/v1/conversions
///
/// Render an edited note sequence into a new transient artifact. Returns
/// 201 with the artifact, including its retrievable audio URL. Calling
/// again for the same session produces a new artifact; it never mutates a
/// prior one.
pub async fn convert(
    State(state): State<AppState>,
    Json(body): Json<ConvertRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ConvertedArtifact>>)> {
    let artifact = state
        .conversions
        .convert(&body.notes, &body.instrument)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: artifact })))
}

/// GET /api/v1/conversions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ConvertedArtifact>>> {
    let artifact = ConvertedRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ConvertedArtifact",
            id,
        }))?;
    Ok(Json(DataResponse { data: artifact }))
}
