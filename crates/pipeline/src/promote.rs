//! Promotion service: keep a transient artifact forever, under a user's
//! ownership.

use std::sync::Arc;

use humlab_cloud::BlobStore;
use humlab_core::types::DbId;
use humlab_db::models::saved_track::{CreateSavedTrack, SavedTrack};
use humlab_db::repositories::{ConvertedRepo, SavedTrackRepo};
use humlab_db::DbPool;

/// Maximum track name length, counted after trimming.
pub const MAX_NAME_LEN: usize = 100;

/// Errors surfaced by the promotion service.
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    /// The name was empty after trimming, or too long.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// The referenced entity is gone, e.g. the artifact was already
    /// reclaimed. Not retryable; the caller must re-convert.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The track exists but belongs to someone else. Surfaced, never
    /// silently ignored.
    #[error("Track {id} is not owned by the requesting user")]
    Unauthorized { id: DbId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Promotes converted artifacts into saved tracks and manages the saved
/// collection.
///
/// Promotion copies the artifact's fields (including the blob reference)
/// into a new owned row; the source artifact is never mutated or deleted
/// here. The existence of the copy is what shields the blob object from
/// reclamation.
pub struct PromotionService {
    pool: DbPool,
    blob_store: Arc<dyn BlobStore>,
}

impl PromotionService {
    pub fn new(pool: DbPool, blob_store: Arc<dyn BlobStore>) -> Self {
        Self { pool, blob_store }
    }

    /// Promote a converted artifact into a saved track owned by `owner_id`.
    ///
    /// Promoting the same artifact twice is legal and yields two tracks
    /// sharing one blob key; the object stays protected until every such
    /// track is deleted.
    pub async fn promote(
        &self,
        artifact_id: DbId,
        owner_id: &str,
        name: &str,
    ) -> Result<SavedTrack, PromotionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PromotionError::InvalidName(
                "name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(PromotionError::InvalidName(format!(
                "name exceeds maximum length of {MAX_NAME_LEN} characters"
            )));
        }

        let artifact = ConvertedRepo::get(&self.pool, artifact_id)
            .await?
            .ok_or(PromotionError::NotFound {
                entity: "ConvertedArtifact",
                id: artifact_id,
            })?;

        let track = SavedTrackRepo::insert(
            &self.pool,
            &CreateSavedTrack {
                owner_id: owner_id.to_string(),
                name: name.to_string(),
                blob_key: artifact.blob_key,
                blob_url: artifact.blob_url,
                instrument: artifact.instrument,
                notes: artifact.notes,
                tempo: artifact.tempo,
                duration_secs: artifact.duration_secs,
            },
        )
        .await?;

        tracing::info!(
            track_id = track.id,
            artifact_id,
            owner_id = %track.owner_id,
            "Artifact promoted to saved track"
        );
        Ok(track)
    }

    /// Fetch one of the owner's saved tracks.
    pub async fn get(&self, track_id: DbId, owner_id: &str) -> Result<SavedTrack, PromotionError> {
        let track = SavedTrackRepo::get(&self.pool, track_id)
            .await?
            .ok_or(PromotionError::NotFound {
                entity: "SavedTrack",
                id: track_id,
            })?;
        if track.owner_id != owner_id {
            return Err(PromotionError::Unauthorized { id: track_id });
        }
        Ok(track)
    }

    /// List the owner's saved tracks, newest first.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<SavedTrack>, PromotionError> {
        Ok(SavedTrackRepo::list_for_owner(&self.pool, owner_id).await?)
    }

    /// Delete one of the owner's saved tracks.
    ///
    /// The blob object is deleted best-effort first: the database row is the
    /// source of truth for "is this still wanted", so a storage failure is
    /// logged and does not block removing the row. An object stranded this
    /// way is unreachable but harmless.
    pub async fn delete(&self, track_id: DbId, owner_id: &str) -> Result<(), PromotionError> {
        let track = self.get(track_id, owner_id).await?;

        if let Err(e) = self.blob_store.delete(&track.blob_key).await {
            tracing::warn!(
                track_id,
                blob_key = %track.blob_key,
                error = %e,
                "Failed to delete blob for saved track; removing row anyway"
            );
        }

        SavedTrackRepo::delete(&self.pool, track_id).await?;
        tracing::info!(track_id, owner_id = %owner_id, "Saved track deleted");
        Ok(())
    }
}
