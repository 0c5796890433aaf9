use std::sync::Arc;

use humlab_cloud::BlobStore;
use humlab_pipeline::{ConversionService, PromotionService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or is already
/// `Clone`. The same blob store instance is shared with the reclamation
/// sweeper, which runs outside the router.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: humlab_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Blob store client, used directly by the recordings handlers.
    pub blob_store: Arc<dyn BlobStore>,
    /// Conversion orchestration.
    pub conversions: Arc<ConversionService>,
    /// Promotion / saved-track management.
    pub promotions: Arc<PromotionService>,
}
