//! Model for raw hum uploads.

use serde::Serialize;
use sqlx::FromRow;

use humlab_core::types::{DbId, Timestamp};

/// A row from the `uploaded_recordings` table.
///
/// Recordings are transient: never mutated, deleted either by the owner or
/// by the reclamation sweeper once past the retention window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UploadedRecording {
    pub id: DbId,
    /// Blob store object key holding the raw audio.
    pub blob_key: String,
    /// Retrieval URL returned by the blob store at upload time.
    pub blob_url: String,
    pub original_filename: String,
    pub created_at: Timestamp,
}

/// DTO for inserting an uploaded recording.
#[derive(Debug, Clone)]
pub struct CreateRecording {
    pub blob_key: String,
    pub blob_url: String,
    pub original_filename: String,
}
