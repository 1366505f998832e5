//! HTTP API handlers for catalog-server

pub mod extract;
pub mod health;
pub mod live;
pub mod products;
pub mod sse;
pub mod ws;

pub use health::health_routes;
pub use live::{create_live, delete_live, list_live};
pub use products::{create_product, delete_product, get_product, list_merged, update_product};
pub use sse::event_stream;
pub use ws::ws_handler;

use serde::Serialize;

/// Envelope for a single created or updated record
#[derive(Debug, Serialize)]
pub struct RecordResponse<T> {
    pub status: &'static str,
    pub product: T,
}

/// Envelope for a whole collection after a delete
#[derive(Debug, Serialize)]
pub struct CollectionResponse<T> {
    pub status: &'static str,
    pub products: Vec<T>,
}

pub(crate) fn record<T>(product: T) -> RecordResponse<T> {
    RecordResponse {
        status: "success",
        product,
    }
}

pub(crate) fn collection<T>(products: Vec<T>) -> CollectionResponse<T> {
    CollectionResponse {
        status: "success",
        products,
    }
}
