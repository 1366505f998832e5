//! catalog-server library - live product catalog
//!
//! Durable catalog and live submission stores, the fan-out channel that
//! keeps every connected viewer on the same merged view, and the HTTP / SSE /
//! WebSocket surface in front of them.

use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod fanout;
pub mod service;
pub mod store;

pub use crate::error::{ApiError, ApiResult};
pub use crate::service::CatalogService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Mutation gateway over both stores
    pub service: CatalogService,
    /// Keep-alive interval for SSE subscribers
    pub sse_keepalive: Duration,
}

impl AppState {
    pub fn new(service: CatalogService, sse_keepalive: Duration) -> Self {
        Self {
            service,
            sse_keepalive,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    let rest = Router::new()
        .route(
            "/api/products",
            get(api::list_merged).post(api::create_product),
        )
        .route(
            "/api/products/:pid",
            get(api::get_product)
                .put(api::update_product)
                .patch(api::update_product)
                .delete(api::delete_product),
        )
        .route(
            "/api/live-products",
            get(api::list_live).post(api::create_live),
        )
        .route("/api/live-products/:id", delete(api::delete_live));

    let push = Router::new()
        .route("/events", get(api::event_stream))
        .route("/ws", get(api::ws_handler));

    Router::new()
        .merge(rest)
        .merge(push)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
