//! Conversion service: sanitized notes -> synthesized audio -> durable
//! artifact.

use std::sync::Arc;

use sqlx::types::Json;

use humlab_cloud::{BlobStore, BlobStoreError};
use humlab_core::error::CoreError;
use humlab_core::note::{sanitize_notes, Note, NoteInput};
use humlab_db::models::converted::{ConvertedArtifact, CreateConvertedArtifact};
use humlab_db::repositories::ConvertedRepo;
use humlab_db::DbPool;
use humlab_synth::{SynthesisEngine, SynthesisError};

/// Blob store folder for rendered audio.
pub const RENDERS_FOLDER: &str = "renders";

/// Tempo assumed when the engine does not report one.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Errors surfaced by [`ConversionService::convert`].
///
/// Each variant tells the caller what to do: fix the input, retry the same
/// request, or re-convert later.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Validation rejected the request. No external call was made.
    #[error("Invalid notes: {0}")]
    InvalidNotes(String),

    /// The synthesis engine failed, timed out, or broke protocol.
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(#[from] SynthesisError),

    /// The blob store rejected the upload. Nothing was persisted.
    #[error("Storage failed: {0}")]
    StorageFailed(#[from] BlobStoreError),

    /// The artifact row could not be written. The uploaded object has been
    /// deleted (best effort) to avoid an orphan.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[source] sqlx::Error),
}

/// Orchestrates one conversion: sanitize, synthesize, upload, persist.
///
/// Stateless and shared: handlers call `convert` concurrently for unrelated
/// sessions with no ordering between them. Re-converting the same session
/// always produces a new artifact with a new blob key; the old one ages out
/// through the sweeper if never promoted.
pub struct ConversionService {
    pool: DbPool,
    blob_store: Arc<dyn BlobStore>,
    engine: Arc<dyn SynthesisEngine>,
}

impl ConversionService {
    pub fn new(
        pool: DbPool,
        blob_store: Arc<dyn BlobStore>,
        engine: Arc<dyn SynthesisEngine>,
    ) -> Self {
        Self {
            pool,
            blob_store,
            engine,
        }
    }

    /// Convert an edited note sequence into a durable rendered artifact.
    ///
    /// Ordering is load-bearing: the upload must complete and the artifact
    /// row must reference it before the synthesis buffer is released. If the
    /// row insert fails after a successful upload, the object is deleted so
    /// no orphan survives, and the original database error is surfaced.
    pub async fn convert(
        &self,
        notes: &[NoteInput],
        instrument: &str,
    ) -> Result<ConvertedArtifact, ConversionError> {
        let instrument = instrument.trim();
        if instrument.is_empty() {
            return Err(ConversionError::InvalidNotes(
                "instrument must not be empty".to_string(),
            ));
        }

        let notes = sanitize_notes(notes).map_err(|e| match e {
            CoreError::Validation(msg) => ConversionError::InvalidNotes(msg),
            other => ConversionError::InvalidNotes(other.to_string()),
        })?;

        let synthesized = self.engine.synthesize(instrument, &notes).await?;

        let object = self
            .blob_store
            .upload(&synthesized.audio, RENDERS_FOLDER)
            .await?;

        let input = CreateConvertedArtifact {
            instrument: instrument.to_string(),
            blob_key: object.key.clone(),
            blob_url: object.url,
            tempo: synthesized.tempo.unwrap_or(DEFAULT_TEMPO),
            duration_secs: synthesized
                .duration_secs
                .unwrap_or_else(|| sequence_end(&notes)),
            notes: Json(notes),
        };

        match ConvertedRepo::insert(&self.pool, &input).await {
            Ok(artifact) => {
                tracing::info!(
                    artifact_id = artifact.id,
                    blob_key = %artifact.blob_key,
                    instrument = %artifact.instrument,
                    "Conversion complete"
                );
                Ok(artifact)
            }
            Err(db_err) => {
                // Compensate for the already-uploaded object; the caller
                // gets the original persistence error either way.
                if let Err(del_err) = self.blob_store.delete(&object.key).await {
                    tracing::warn!(
                        blob_key = %object.key,
                        error = %del_err,
                        "Failed to delete orphaned upload after persistence failure"
                    );
                }
                Err(ConversionError::PersistenceFailed(db_err))
            }
        }
    }
}

/// Latest end time in the sequence; the duration fallback when the engine
/// reports none.
fn sequence_end(notes: &[Note]) -> f64 {
    notes.iter().fold(0.0, |acc, n| acc.max(n.end))
}
