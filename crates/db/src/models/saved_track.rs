//! Model for permanently kept tracks.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use humlab_core::note::Note;
use humlab_core::types::{DbId, Timestamp};

/// A row from the `saved_tracks` table.
///
/// A user's permanent keep of a converted artifact. Carries a denormalized
/// copy of the artifact's fields rather than a live reference; the shared
/// `blob_key` is what shields the blob store object from reclamation while
/// at least one saved track holds it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedTrack {
    pub id: DbId,
    /// Opaque owner identifier supplied by the upstream auth layer.
    pub owner_id: String,
    pub name: String,
    pub blob_key: String,
    pub blob_url: String,
    pub instrument: String,
    pub notes: Json<Vec<Note>>,
    pub tempo: f64,
    pub duration_secs: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a saved track.
#[derive(Debug, Clone)]
pub struct CreateSavedTrack {
    pub owner_id: String,
    pub name: String,
    pub blob_key: String,
    pub blob_url: String,
    pub instrument: String,
    pub notes: Json<Vec<Note>>,
    pub tempo: f64,
    pub duration_secs: f64,
}
