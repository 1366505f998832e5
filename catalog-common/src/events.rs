//! Push channel wire messages
//!
//! Subscribers (SSE or WebSocket) receive `updateProducts` carrying the full
//! merged view. WebSocket subscribers may also send live-buffer events back.
//! Both directions use the `{"event": ..., "data": ...}` envelope.

use crate::models::MergedView;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Event name for merged view pushes
pub const UPDATE_PRODUCTS: &str = "updateProducts";

/// Server → subscriber message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
    /// Current merged view, catalog first
    UpdateProducts(&'a MergedView),
}

impl ServerMessage<'_> {
    /// Event type string, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerMessage::UpdateProducts(_) => UPDATE_PRODUCTS,
        }
    }

    /// JSON payload without the envelope (SSE carries the event name separately)
    pub fn data_json(&self) -> serde_json::Result<String> {
        match self {
            ServerMessage::UpdateProducts(view) => serde_json::to_string(view),
        }
    }
}

/// Subscriber → server message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Remove a live submission by id
    DeleteProduct(Uuid),
    /// Create a live submission without an attachment
    NewProduct(Value),
}
