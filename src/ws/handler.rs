//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::connection::subscribe;
use crate::app_state::AppState;
use crate::domain::RoomId;
use crate::error::BrokerError;

/// `GET /api/v1/ws/{room_id}` — Upgrade to WebSocket and subscribe to a room.
///
/// # Errors
///
/// Returns [`BrokerError::InvalidRoom`] if `room_id` is not a valid room
/// key; no connection is upgraded in that case.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerError> {
    let room = RoomId::new(room_id)?;
    let hub = state.hub.clone();
    let settings = state.client_settings;

    Ok(ws
        .max_message_size(state.max_message_size)
        .on_upgrade(move |socket| subscribe(socket, room, hub, settings)))
}
