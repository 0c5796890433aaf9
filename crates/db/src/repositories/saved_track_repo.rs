//! Repository for saved tracks.

use sqlx::PgPool;

use humlab_core::types::DbId;

use crate::models::saved_track::{CreateSavedTrack, SavedTrack};

/// Column list for `saved_tracks` queries.
const TRACK_COLUMNS: &str = "\
    id, owner_id, name, blob_key, blob_url, instrument, notes, \
    tempo, duration_secs, created_at, updated_at";

/// CRUD operations for a user's permanently kept tracks.
pub struct SavedTrackRepo;

impl SavedTrackRepo {
    /// Insert a new saved track.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateSavedTrack,
    ) -> Result<SavedTrack, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_tracks \
                 (owner_id, name, blob_key, blob_url, instrument, notes, tempo, duration_secs) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {TRACK_COLUMNS}"
        );
        sqlx::query_as::<_, SavedTrack>(&query)
            .bind(&input.owner_id)
            .bind(&input.name)
            .bind(&input.blob_key)
            .bind(&input.blob_url)
            .bind(&input.instrument)
            .bind(&input.notes)
            .bind(input.tempo)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Get a single saved track by ID, regardless of owner.
    ///
    /// Ownership enforcement is the promotion service's job; the repository
    /// fetches the row so the service can distinguish "gone" from "not
    /// yours".
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<SavedTrack>, sqlx::Error> {
        let query = format!("SELECT {TRACK_COLUMNS} FROM saved_tracks WHERE id = $1");
        sqlx::query_as::<_, SavedTrack>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's saved tracks, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: &str,
    ) -> Result<Vec<SavedTrack>, sqlx::Error> {
        let query = format!(
            "SELECT {TRACK_COLUMNS} FROM saved_tracks \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SavedTrack>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a saved track by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM saved_tracks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any saved track references the given blob key.
    ///
    /// The reclamation sweeper's point-in-time existence probe: a converted
    /// artifact whose blob key matches at least one saved track must not be
    /// reclaimed.
    pub async fn exists_with_blob_key(pool: &PgPool, blob_key: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM saved_tracks WHERE blob_key = $1)",
        )
        .bind(blob_key)
        .fetch_one(pool)
        .await
    }
}
