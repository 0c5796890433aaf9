use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use humlab_api::config::{BlobBackendConfig, ServerConfig};
use humlab_api::router::build_app_router;
use humlab_api::state::AppState;
use humlab_cloud::{BlobStore, LocalBlobStore, S3BlobStore};
use humlab_pipeline::{ConversionService, PromotionService, ReclamationSweeper};
use humlab_synth::ProcessSynthesisEngine;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "humlab_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = humlab_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    humlab_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    humlab_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Blob store ---
    let blob_store: Arc<dyn BlobStore> = match &config.blob_backend {
        BlobBackendConfig::Local { base_dir, url_base } => {
            tracing::info!(dir = %base_dir, "Using local blob store");
            Arc::new(LocalBlobStore::new(base_dir.clone(), url_base.clone()))
        }
        BlobBackendConfig::S3 {
            bucket,
            public_url_base,
        } => {
            tracing::info!(bucket = %bucket, "Using S3 blob store");
            Arc::new(S3BlobStore::from_env(bucket.clone(), public_url_base.clone()).await)
        }
    };

    // --- Synthesis engine ---
    let engine = Arc::new(
        ProcessSynthesisEngine::new(config.synth_command.clone())
            .with_timeout(Duration::from_secs(config.synthesis_timeout_secs)),
    );
    tracing::info!(command = ?config.synth_command, "Synthesis engine configured");

    // --- Services ---
    let conversions = Arc::new(ConversionService::new(
        pool.clone(),
        Arc::clone(&blob_store),
        engine,
    ));
    let promotions = Arc::new(PromotionService::new(pool.clone(), Arc::clone(&blob_store)));

    // --- Reclamation sweeper ---
    // One long-lived task owned by this process; cancelled at shutdown.
    let sweeper = ReclamationSweeper::new(
        pool.clone(),
        Arc::clone(&blob_store),
        chrono::Duration::hours(config.retention_hours),
        Duration::from_secs(config.sweep_period_secs),
    );
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = {
        let cancel = sweep_cancel.clone();
        tokio::spawn(async move { sweeper.run(cancel).await })
    };

    // --- App state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store,
        conversions,
        promotions,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        sweep_handle,
    )
    .await;
    tracing::info!("Reclamation sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
