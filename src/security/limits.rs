//! Request size limits.
//!
//! Bodies over `security.max_body_size` are rejected with 413 before the
//! JSON extractor buffers them.

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Apply the body size limit to every route of `router`.
pub fn apply_body_limit<S>(router: Router<S>, max_body_size: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size))
}
