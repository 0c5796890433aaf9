//! Subprocess-backed synthesis engine.
//!
//! Spawns the configured command once per invocation, appending the
//! instrument name and a scratch output path as arguments. The note
//! sequence is piped to stdin as JSON; the engine must write the rendered
//! audio to the output path and exactly one JSON result object to stdout:
//!
//! ```text
//! {"status":"ok","tempo":103.2,"duration":4.5}
//! {"status":"error","message":"unknown instrument"}
//! ```
//!
//! Anything else on stdout is a protocol violation, not something to be
//! scraped around.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use humlab_core::note::Note;

use crate::{Synthesized, SynthesisEngine, SynthesisError, DEFAULT_SYNTHESIS_TIMEOUT};

/// Maximum stdout or stderr size captured per stream (1 MiB). The audio
/// itself travels through the output file, so anything near this limit is a
/// misbehaving engine.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Name of the rendered file inside the per-invocation scratch directory.
const RENDER_FILE: &str = "render.wav";

/// JSON result object the engine must print to stdout.
#[derive(Debug, Deserialize)]
struct EngineResult {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    tempo: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

/// [`SynthesisEngine`] implementation that runs an external command.
pub struct ProcessSynthesisEngine {
    /// Program plus leading arguments, e.g. `["python3", "synth_engine.py"]`.
    command: Vec<String>,
    timeout: Duration,
}

impl ProcessSynthesisEngine {
    /// Create an engine running `command` with the default 60 s timeout.
    ///
    /// `command` must contain at least the program name.
    pub fn new(command: Vec<String>) -> Self {
        assert!(!command.is_empty(), "engine command must not be empty");
        Self {
            command,
            timeout: DEFAULT_SYNTHESIS_TIMEOUT,
        }
    }

    /// Override the invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SynthesisEngine for ProcessSynthesisEngine {
    async fn synthesize(
        &self,
        instrument: &str,
        notes: &[Note],
    ) -> Result<Synthesized, SynthesisError> {
        // Scratch directory for this invocation; removed on drop, after the
        // rendered bytes have been read into memory.
        let scratch = tempfile::tempdir()?;
        let out_path = scratch.path().join(RENDER_FILE);

        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .arg(instrument)
            .arg(&out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Killed when dropped, which is how the timeout path terminates
            // the child.
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Pipe the note document to stdin, then close it. Best-effort: an
        // engine that exits before reading everything still gets judged by
        // its exit status and stdout.
        if let Some(mut stdin) = child.stdin.take() {
            let payload = serde_json::to_vec(notes)
                .map_err(|e| SynthesisError::Malformed(format!("note serialization: {e}")))?;
            let _ = stdin.write_all(&payload).await;
            drop(stdin);
        }

        // Read stdout/stderr in spawned tasks so `child.wait()` can run
        // concurrently.
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(SynthesisError::Io(e)),
            Err(_elapsed) => {
                // Timeout expired. Dropping `child` kills the process via
                // kill_on_drop.
                return Err(SynthesisError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default()).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default()).into_owned();

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            tracing::warn!(exit_code, "Synthesis engine exited with failure");
            return Err(SynthesisError::Failed { exit_code, message });
        }

        let result = parse_engine_result(&stdout)?;
        match result.status.as_str() {
            "ok" => {
                let audio = tokio::fs::read(&out_path).await.map_err(|_| {
                    SynthesisError::Malformed(
                        "engine reported success but wrote no audio file".to_string(),
                    )
                })?;
                tracing::debug!(
                    bytes = audio.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Synthesis complete"
                );
                Ok(Synthesized {
                    audio,
                    tempo: result.tempo,
                    duration_secs: result.duration,
                })
            }
            "error" => Err(SynthesisError::Failed {
                exit_code: 0,
                message: result
                    .message
                    .unwrap_or_else(|| "engine reported an unspecified error".to_string()),
            }),
            other => Err(SynthesisError::Malformed(format!(
                "unknown result status '{other}'"
            ))),
        }
    }
}

/// Parse the single JSON result object the engine must print to stdout.
fn parse_engine_result(stdout: &str) -> Result<EngineResult, SynthesisError> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| SynthesisError::Malformed(format!("stdout is not a JSON result: {e}")))
}

/// Read an entire output stream into a byte buffer, capped at
/// [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
