//! WebSocket subscriber endpoint
//!
//! Pushes the same `updateProducts` messages as SSE and accepts the live
//! buffer events `deleteProduct` and `newProduct` from the client.

use crate::fanout::SubscriberId;
use crate::service::CatalogService;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use catalog_common::events::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

/// GET /ws - upgrade to a WebSocket subscriber
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.service))
}

async fn handle_socket(socket: WebSocket, service: CatalogService) {
    let subscription = match service.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("WebSocket subscriber rejected: {}", e);
            return;
        }
    };
    let id = subscription.id();
    info!("New WebSocket client connected as subscriber {}", id);

    let (mut sender, mut receiver) = socket.split();

    let mut push_task = tokio::spawn(async move {
        let mut updates = Box::pin(subscription.into_stream());
        while let Some(view) = updates.next().await {
            let text = match serde_json::to_string(&ServerMessage::UpdateProducts(&view)) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to serialize merged view: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                debug!("Subscriber {} socket closed during send", id);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => handle_client_text(&service, id, &text).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Client gone: stop pushing. Push side failed: the socket is closing, so
    // the receive side drains and returns without cutting off an event that
    // is still being applied. Dropping the subscription unregisters it.
    tokio::select! {
        _ = &mut push_task => {
            if let Err(e) = recv_task.await {
                warn!("Subscriber {} receive task failed: {}", id, e);
            }
        }
        _ = &mut recv_task => push_task.abort(),
    }
    info!("WebSocket subscriber {} closed", id);
}

async fn handle_client_text(service: &CatalogService, id: SubscriberId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Subscriber {} sent an unrecognized message: {}", id, e);
            return;
        }
    };

    debug!("Subscriber {} event: {:?}", id, message);
    if let Err(e) = service.handle_client_message(message).await {
        warn!("Subscriber {} event failed: {}", id, e);
    }
}
