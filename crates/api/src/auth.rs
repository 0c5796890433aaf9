//! Caller identity extraction.
//!
//! Authentication itself lives upstream (a gateway or auth proxy) and is
//! out of scope here; what arrives is an opaque owner identifier in the
//! `x-user-id` header. [`OwnerId`] extracts it and rejects owner-scoped
//! requests that lack one.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header carrying the authenticated caller's opaque identifier.
pub const OWNER_ID_HEADER: &str = "x-user-id";

/// The requesting user's opaque identifier.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| OwnerId(id.to_string()))
            .ok_or_else(|| {
                AppError::Unauthorized(format!("Missing {OWNER_ID_HEADER} header"))
            })
    }
}
