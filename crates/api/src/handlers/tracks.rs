//! Handlers for the `/tracks` resource: a user's saved tracks.
//!
//! Every route here is owner-scoped; the [`OwnerId`] extractor rejects
//! requests without a caller identity before the handler body runs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use humlab_core::types::DbId;
use humlab_db::models::saved_track::SavedTrack;

use crate::auth::OwnerId;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for promoting a converted artifact.
#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub artifact_id: DbId,
    pub name: String,
}

/// POST /api/v1/tracks
///
/// Promote a converted artifact into a permanently kept track. Returns 201.
/// Fails with 404 if the artifact was already reclaimed; the client should
/// re-convert and retry.
pub async fn promote(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(body): Json<PromoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedTrack>>)> {
    let track = state
        .promotions
        .promote(body.artifact_id, &owner_id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: track })))
}

/// GET /api/v1/tracks
///
/// List the caller's saved tracks, newest first.
pub async fn list(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> AppResult<Json<DataResponse<Vec<SavedTrack>>>> {
    let tracks = state.promotions.list(&owner_id).await?;
    Ok(Json(DataResponse { data: tracks }))
}

/// GET /api/v1/tracks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SavedTrack>>> {
    let track = state.promotions.get(id, &owner_id).await?;
    Ok(Json(DataResponse { data: track }))
}

/// DELETE /api/v1/tracks/{id}
///
/// Delete one of the caller's saved tracks (and, best-effort, its blob
/// object). Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.promotions.delete(id, &owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
