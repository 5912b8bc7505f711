//! Read-only operator surface.
//!
//! # Routes
//! - `GET /admin/status`: service version
//! - `GET /admin/breakers`: snapshots of every registered breaker
//! - `GET /admin/breakers/{name}`: one snapshot, 404 if unknown

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::registry::BreakerRegistry;

/// Shared state for admin handlers.
#[derive(Clone, Debug)]
pub struct AdminState {
    pub registry: BreakerRegistry,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(registry: BreakerRegistry, config: &AdminConfig) -> Router {
    let state = AdminState {
        registry,
        api_key: Arc::from(config.api_key.as_str()),
    };

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/breakers", get(get_breakers))
        .route("/admin/breakers/{name}", get(get_breaker))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
