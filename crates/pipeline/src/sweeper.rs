//! Reclamation sweeper: recurring deletion of artifacts that aged out
//! without being kept.
//!
//! One long-lived task, started by the host process at startup and stopped
//! through a [`CancellationToken`] at shutdown. Its dependencies are passed
//! in explicitly; there is no global scheduler state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use humlab_cloud::BlobStore;
use humlab_db::repositories::{ConvertedRepo, RecordingRepo, SavedTrackRepo};
use humlab_db::DbPool;

/// How long uploads and unpromoted artifacts are retained.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(12 * 60 * 60);

/// How often the sweeper runs.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(12 * 60 * 60);

/// What one sweep run did. Logged, not surfaced: the sweeper has no caller
/// to report to.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub recordings_deleted: u32,
    pub artifacts_deleted: u32,
    pub artifacts_retained: u32,
    pub errors: Vec<String>,
}

/// Deletes expired uploaded recordings and expired, unpromoted converted
/// artifacts, blob object first, database row second.
///
/// Per-item failures are caught and recorded; an item that fails to delete
/// still matches the cutoff predicate next run, which is the only retry
/// mechanism. A run cancelled mid-iteration leaves the data model valid
/// because each item is a complete blob-then-row pair.
pub struct ReclamationSweeper {
    pool: DbPool,
    blob_store: Arc<dyn BlobStore>,
    retention: chrono::Duration,
    period: Duration,
}

impl ReclamationSweeper {
    pub fn new(
        pool: DbPool,
        blob_store: Arc<dyn BlobStore>,
        retention: chrono::Duration,
        period: Duration,
    ) -> Self {
        Self {
            pool,
            blob_store,
            retention,
            period,
        }
    }

    /// Run sweeps on the configured period until cancelled.
    ///
    /// `MissedTickBehavior::Skip` means a tick that fires while a run is
    /// still executing is dropped, not queued: runs never overlap and never
    /// pile up.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            period_secs = self.period.as_secs(),
            retention_hours = self.retention.num_hours(),
            "Reclamation sweeper started"
        );

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reclamation sweeper stopping");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.run_once().await;
                    if report.errors.is_empty() {
                        tracing::info!(
                            recordings_deleted = report.recordings_deleted,
                            artifacts_deleted = report.artifacts_deleted,
                            artifacts_retained = report.artifacts_retained,
                            "Sweep complete"
                        );
                    } else {
                        tracing::warn!(
                            recordings_deleted = report.recordings_deleted,
                            artifacts_deleted = report.artifacts_deleted,
                            artifacts_retained = report.artifacts_retained,
                            errors = report.errors.len(),
                            "Sweep completed with errors"
                        );
                    }
                }
            }
        }
    }

    /// Execute a single sweep and return what it did.
    pub async fn run_once(&self) -> SweepReport {
        let cutoff = Utc::now() - self.retention;
        let mut report = SweepReport::default();

        // Expired raw uploads are always transient; no reference check.
        match RecordingRepo::find_older_than(&self.pool, cutoff).await {
            Ok(recordings) => {
                for recording in recordings {
                    match self.delete_recording(recording.id, &recording.blob_key).await {
                        Ok(()) => report.recordings_deleted += 1,
                        Err(msg) => {
                            tracing::warn!(
                                recording_id = recording.id,
                                blob_key = %recording.blob_key,
                                error = %msg,
                                "Failed to reclaim recording"
                            );
                            report.errors.push(msg);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Sweep could not list expired recordings");
                report.errors.push(format!("listing recordings: {e}"));
            }
        }

        // Expired artifacts are reclaimed only when no saved track still
        // references their blob key. The existence probe is a point-in-time
        // read; a promotion racing this sweep either wins (retained) or
        // loses and surfaces NotFound to its caller.
        match ConvertedRepo::find_older_than(&self.pool, cutoff).await {
            Ok(artifacts) => {
                for artifact in artifacts {
                    match self.reclaim_artifact(artifact.id, &artifact.blob_key).await {
                        Ok(true) => report.artifacts_deleted += 1,
                        Ok(false) => {
                            tracing::debug!(
                                artifact_id = artifact.id,
                                blob_key = %artifact.blob_key,
                                "Artifact retained by saved track reference"
                            );
                            report.artifacts_retained += 1;
                        }
                        Err(msg) => {
                            tracing::warn!(
                                artifact_id = artifact.id,
                                blob_key = %artifact.blob_key,
                                error = %msg,
                                "Failed to reclaim artifact"
                            );
                            report.errors.push(msg);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Sweep could not list expired artifacts");
                report.errors.push(format!("listing artifacts: {e}"));
            }
        }

        report
    }

    async fn delete_recording(&self, id: i64, blob_key: &str) -> Result<(), String> {
        self.blob_store
            .delete(blob_key)
            .await
            .map_err(|e| format!("recording {id}: {e}"))?;
        RecordingRepo::delete(&self.pool, id)
            .await
            .map_err(|e| format!("recording {id}: {e}"))?;
        Ok(())
    }

    /// Returns `Ok(true)` if the artifact was reclaimed, `Ok(false)` if a
    /// saved track reference retained it.
    async fn reclaim_artifact(&self, id: i64, blob_key: &str) -> Result<bool, String> {
        let referenced = SavedTrackRepo::exists_with_blob_key(&self.pool, blob_key)
            .await
            .map_err(|e| format!("artifact {id}: {e}"))?;
        if referenced {
            return Ok(false);
        }

        self.blob_store
            .delete(blob_key)
            .await
            .map_err(|e| format!("artifact {id}: {e}"))?;
        ConvertedRepo::delete(&self.pool, id)
            .await
            .map_err(|e| format!("artifact {id}: {e}"))?;
        Ok(true)
    }
}
