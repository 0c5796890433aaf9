//! Shared helpers for HTTP integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;

use humlab_api::config::{BlobBackendConfig, ServerConfig};
use humlab_api::router::build_app_router;
use humlab_api::state::AppState;
use humlab_cloud::MemoryBlobStore;
use humlab_core::note::Note;
use humlab_pipeline::{ConversionService, PromotionService};
use humlab_synth::{Synthesized, SynthesisEngine, SynthesisError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        retention_hours: 12,
        sweep_period_secs: 43200,
        synthesis_timeout_secs: 60,
        synth_command: vec!["synth-engine".to_string()],
        blob_backend: BlobBackendConfig::Local {
            base_dir: "./blobs".to_string(),
            url_base: "http://localhost:3000/blobs".to_string(),
        },
    }
}

/// Synthesis engine double: renders fixed bytes, reports no tempo.
pub struct StubEngine;

#[async_trait]
impl SynthesisEngine for StubEngine {
    async fn synthesize(
        &self,
        _instrument: &str,
        _notes: &[Note],
    ) -> Result<Synthesized, SynthesisError> {
        Ok(Synthesized {
            audio: b"wav-bytes".to_vec(),
            tempo: None,
            duration_secs: Some(1.0),
        })
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool, an in-memory blob store, and the stub engine.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let blob_store = Arc::new(MemoryBlobStore::new());
    let engine = Arc::new(StubEngine);

    let conversions = Arc::new(ConversionService::new(
        pool.clone(),
        blob_store.clone(),
        engine,
    ));
    let promotions = Arc::new(PromotionService::new(pool.clone(), blob_store.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store,
        conversions,
        promotions,
    };

    build_app_router(state, &config)
}
