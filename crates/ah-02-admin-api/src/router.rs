//! Router assembly: routes, body limit and the middleware stack.

use crate::domain::config::AdminApiConfig;
use crate::handlers;
use crate::middleware::{create_cors_layer, TimeoutLayer, TracingLayer};
use ah_01_lot_sequencing::LotSequencingApi;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn LotSequencingApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn LotSequencingApi>) -> Self {
        Self { api }
    }
}

/// Build the admin router.
pub fn create_router(state: AppState, config: &AdminApiConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(TimeoutLayer::new(config.timeouts.request));

    Router::new()
        .route(
            "/api/admin/lots/reorder",
            put(handlers::reorder_lots).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/admin/lots/renumber",
            post(handlers::renumber_lots).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/admin/lots",
            post(handlers::create_lot)
                .get(handlers::list_lots)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(middleware)
        .with_state(state)
}
