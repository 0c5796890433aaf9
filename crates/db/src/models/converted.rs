//! Model for synthesis results.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use humlab_core::note::Note;
use humlab_core::types::{DbId, Timestamp};

/// A row from the `converted_artifacts` table.
///
/// One synthesis result. Immutable after creation; re-converting the same
/// session produces a new row with a new blob key. Reclaimed by the sweeper
/// when expired and not referenced by any saved track.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConvertedArtifact {
    pub id: DbId,
    /// The sanitized note sequence the synthesis ran on.
    pub notes: Json<Vec<Note>>,
    pub instrument: String,
    pub blob_key: String,
    pub blob_url: String,
    /// Beats per minute reported by the engine, or the 120 default.
    pub tempo: f64,
    pub duration_secs: f64,
    pub created_at: Timestamp,
}

/// DTO for inserting a converted artifact.
#[derive(Debug, Clone)]
pub struct CreateConvertedArtifact {
    pub notes: Json<Vec<Note>>,
    pub instrument: String,
    pub blob_key: String,
    pub blob_url: String,
    pub tempo: f64,
    pub duration_secs: f64,
}
