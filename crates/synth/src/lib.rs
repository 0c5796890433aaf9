//! Synthesis engine client.
//!
//! The engine that renders a note sequence into audio is an external
//! process. [`SynthesisEngine`] is the seam the conversion pipeline talks
//! through; [`ProcessSynthesisEngine`] is the production implementation that
//! spawns the configured command with a bounded timeout and a structured
//! stdin/stdout protocol.

use std::time::Duration;

use async_trait::async_trait;

use humlab_core::note::Note;

mod process;

pub use process::ProcessSynthesisEngine;

/// Wall-clock bound on one engine invocation. A render that exceeds this is
/// treated as failed and the child process is killed.
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// A successful synthesis result.
#[derive(Debug, Clone)]
pub struct Synthesized {
    /// The rendered audio, read fully into memory. The conversion pipeline
    /// keeps this buffer alive until the artifact row referencing its
    /// uploaded copy is durably written.
    pub audio: Vec<u8>,
    /// Beats per minute detected by the engine, if reported.
    pub tempo: Option<f64>,
    /// Rendered duration in seconds, if reported.
    pub duration_secs: Option<f64>,
}

/// Errors from a synthesis invocation.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The engine exceeded its timeout and was killed.
    #[error("Synthesis timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The engine reported failure (non-zero exit, or a structured error
    /// result).
    #[error("Synthesis failed (exit code {exit_code}): {message}")]
    Failed { exit_code: i32, message: String },

    /// The engine exited successfully but its output violated the protocol
    /// (no JSON result, unknown status, missing audio file).
    #[error("Engine produced malformed output: {0}")]
    Malformed(String),

    /// Spawning or communicating with the engine process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders note sequences into audio.
///
/// Implementations must be repeatable and free of cross-invocation state:
/// the pipeline may call `synthesize` concurrently for unrelated sessions.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    async fn synthesize(
        &self,
        instrument: &str,
        notes: &[Note],
    ) -> Result<Synthesized, SynthesisError>;
}
