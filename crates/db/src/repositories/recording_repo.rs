//! Repository for uploaded recordings.

use sqlx::PgPool;

use humlab_core::types::{DbId, Timestamp};

use crate::models::recording::{CreateRecording, UploadedRecording};

/// Column list for `uploaded_recordings` queries.
const RECORDING_COLUMNS: &str = "id, blob_key, blob_url, original_filename, created_at";

/// CRUD operations for raw hum uploads.
pub struct RecordingRepo;

impl RecordingRepo {
    /// Insert a new uploaded recording.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateRecording,
    ) -> Result<UploadedRecording, sqlx::Error> {
        let query = format!(
            "INSERT INTO uploaded_recordings (blob_key, blob_url, original_filename) \
             VALUES ($1, $2, $3) \
             RETURNING {RECORDING_COLUMNS}"
        );
        sqlx::query_as::<_, UploadedRecording>(&query)
            .bind(&input.blob_key)
            .bind(&input.blob_url)
            .bind(&input.original_filename)
            .fetch_one(pool)
            .await
    }

    /// Get a single recording by ID.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<UploadedRecording>, sqlx::Error> {
        let query = format!("SELECT {RECORDING_COLUMNS} FROM uploaded_recordings WHERE id = $1");
        sqlx::query_as::<_, UploadedRecording>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all recordings, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<UploadedRecording>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORDING_COLUMNS} FROM uploaded_recordings ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, UploadedRecording>(&query)
            .fetch_all(pool)
            .await
    }

    /// Delete a recording by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM uploaded_recordings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find recordings created before `cutoff`, oldest first.
    ///
    /// Used by the reclamation sweeper; an item that fails to delete in one
    /// run still matches this predicate on the next.
    pub async fn find_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<UploadedRecording>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORDING_COLUMNS} FROM uploaded_recordings \
             WHERE created_at < $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, UploadedRecording>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }
}
