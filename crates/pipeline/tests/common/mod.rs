//! Shared test doubles for the lifecycle tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use humlab_cloud::{BlobObject, BlobStore, BlobStoreError, MemoryBlobStore};
use humlab_core::note::{Note, NoteInput};
use humlab_synth::{Synthesized, SynthesisEngine, SynthesisError};

/// Synthesis engine double returning a fixed result and counting calls.
pub struct StubEngine {
    audio: Vec<u8>,
    tempo: Option<f64>,
    duration_secs: Option<f64>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubEngine {
    /// An engine that renders `audio` and reports no metadata.
    pub fn ok(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            tempo: None,
            duration_secs: None,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_tempo(mut self, tempo: f64) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// An engine that always reports failure.
    pub fn failing() -> Self {
        let mut engine = Self::ok(b"");
        engine.fail = true;
        engine
    }

    /// Number of synthesize calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisEngine for StubEngine {
    async fn synthesize(
        &self,
        _instrument: &str,
        _notes: &[Note],
    ) -> Result<Synthesized, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SynthesisError::Failed {
                exit_code: 1,
                message: "stub failure".to_string(),
            });
        }
        Ok(Synthesized {
            audio: self.audio.clone(),
            tempo: self.tempo,
            duration_secs: self.duration_secs,
        })
    }
}

/// Blob store double that can be told to fail uploads, or deletes of
/// specific keys, while otherwise behaving like [`MemoryBlobStore`].
#[derive(Default)]
pub struct FlakyBlobStore {
    pub inner: MemoryBlobStore,
    fail_uploads: bool,
    fail_delete_keys: Mutex<HashSet<String>>,
}

impl FlakyBlobStore {
    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn fail_deletes_of(&self, key: &str) {
        self.fail_delete_keys
            .lock()
            .unwrap()
            .insert(key.to_string());
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn upload(&self, bytes: &[u8], folder: &str) -> Result<BlobObject, BlobStoreError> {
        if self.fail_uploads {
            return Err(BlobStoreError::Upload("stub upload failure".to_string()));
        }
        self.inner.upload(bytes, folder).await
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        if self.fail_delete_keys.lock().unwrap().contains(key) {
            return Err(BlobStoreError::Delete("stub delete failure".to_string()));
        }
        self.inner.delete(key).await
    }
}

/// A well-formed note input.
pub fn note_input(note: &str, start: f64, end: f64) -> NoteInput {
    NoteInput {
        note: note.to_string(),
        start,
        end,
        duration: None,
        volume: None,
        vibrato: false,
        breathy: false,
        confidence: None,
    }
}
