//! Route definitions.

pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers::{conversions, recordings, tracks};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST   /recordings          upload a raw hum (multipart, field "audio")
/// GET    /recordings          list uploads
/// GET    /recordings/{id}     get one upload
/// DELETE /recordings/{id}     delete upload (blob best-effort, then row)
///
/// POST   /conversions         render notes into a transient artifact
/// GET    /conversions/{id}    get one artifact
///
/// POST   /tracks              promote an artifact (owner header required)
/// GET    /tracks              list the caller's saved tracks
/// GET    /tracks/{id}         get one saved track
/// DELETE /tracks/{id}         delete a saved track
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/recordings", recordings_router())
        .nest("/conversions", conversions_router())
        .nest("/tracks", tracks_router())
}

fn recordings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(recordings::list).post(recordings::upload))
        .route(
            "/{id}",
            get(recordings::get_by_id).delete(recordings::delete),
        )
}

fn conversions_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(conversions::convert))
        .route("/{id}", get(conversions::get_by_id))
}

fn tracks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tracks::list).post(tracks::promote))
        .route("/{id}", get(tracks::get_by_id).delete(tracks::delete))
}
