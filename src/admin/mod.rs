//! Operator endpoints behind a bearer token.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use self::auth::{admin_auth_middleware, AdminKey};
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState, api_key: &str) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/relayer", get(get_relayer))
        .layer(middleware::from_fn_with_state(
            AdminKey(Arc::from(api_key)),
            admin_auth_middleware,
        ))
        .with_state(state)
}
