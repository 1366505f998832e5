//! Server-Sent Events subscriber endpoint
//!
//! Streams `updateProducts` events: the merged view at connect time, then one
//! per successful mutation.

use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use catalog_common::events::ServerMessage;
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use tracing::{info, warn};

/// GET /events - SSE event stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let subscription = state.service.subscribe().await?;
    info!("New SSE client connected as subscriber {}", subscription.id());

    let stream = subscription.into_stream().filter_map(|view| async move {
        let message = ServerMessage::UpdateProducts(&view);
        match message.data_json() {
            Ok(json) => Some(Ok(Event::default().event(message.event_type()).data(json))),
            Err(e) => {
                warn!("Failed to serialize merged view: {}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.sse_keepalive)
            .text("keep-alive"),
    ))
}
