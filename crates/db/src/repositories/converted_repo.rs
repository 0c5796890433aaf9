//! Repository for converted artifacts.

use sqlx::PgPool;

use humlab_core::types::{DbId, Timestamp};

use crate::models::converted::{ConvertedArtifact, CreateConvertedArtifact};

/// Column list for `converted_artifacts` queries.
const ARTIFACT_COLUMNS: &str =
    "id, notes, instrument, blob_key, blob_url, tempo, duration_secs, created_at";

/// CRUD operations for synthesis results.
pub struct ConvertedRepo;

impl ConvertedRepo {
    /// Insert a new converted artifact.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateConvertedArtifact,
    ) -> Result<ConvertedArtifact, sqlx::Error> {
        let query = format!(
            "INSERT INTO converted_artifacts \
                 (notes, instrument, blob_key, blob_url, tempo, duration_secs) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ARTIFACT_COLUMNS}"
        );
        sqlx::query_as::<_, ConvertedArtifact>(&query)
            .bind(&input.notes)
            .bind(&input.instrument)
            .bind(&input.blob_key)
            .bind(&input.blob_url)
            .bind(input.tempo)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Get a single artifact by ID.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<ConvertedArtifact>, sqlx::Error> {
        let query = format!("SELECT {ARTIFACT_COLUMNS} FROM converted_artifacts WHERE id = $1");
        sqlx::query_as::<_, ConvertedArtifact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an artifact by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM converted_artifacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find artifacts created before `cutoff`, oldest first.
    pub async fn find_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<ConvertedArtifact>, sqlx::Error> {
        let query = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM converted_artifacts \
             WHERE created_at < $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ConvertedArtifact>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }
}
