//! Room handlers: directory statistics and publishing.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{PublishResponse, RoomSubscribersResponse};
use crate::app_state::AppState;
use crate::domain::RoomId;
use crate::error::{BrokerError, ErrorResponse};
use crate::hub::DirectoryStats;

/// `GET /rooms` — Snapshot of every live room.
///
/// # Errors
///
/// Returns [`BrokerError::HubUnavailable`] if the hub has stopped.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List live rooms",
    description = "Returns every room that currently has at least one subscriber, with subscriber counts.",
    responses(
        (status = 200, description = "Directory snapshot", body = DirectoryStats),
        (status = 503, description = "Hub unavailable", body = ErrorResponse),
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> Result<impl IntoResponse, BrokerError> {
    let stats = state.hub.stats().await?;
    Ok(Json(stats))
}

/// `GET /rooms/{room_id}` — Subscriber count of one room.
///
/// # Errors
///
/// Returns [`BrokerError::InvalidRoom`] for a malformed key, or
/// [`BrokerError::HubUnavailable`] if the hub has stopped.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    summary = "Get room subscriber count",
    params(
        ("room_id" = String, Path, description = "Room key"),
    ),
    responses(
        (status = 200, description = "Subscriber count", body = RoomSubscribersResponse),
        (status = 400, description = "Invalid room key", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, BrokerError> {
    let room = RoomId::new(room_id)?;
    let subscribers = state.hub.room_subscribers(&room).await?;
    Ok(Json(RoomSubscribersResponse {
        room: room.to_string(),
        subscribers,
    }))
}

/// `POST /rooms/{room_id}/events` — Publish the request body to a room.
///
/// The body is forwarded verbatim. Publishing to a room without
/// subscribers still succeeds.
///
/// # Errors
///
/// Returns [`BrokerError::InvalidRoom`] for a malformed key.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/events",
    tag = "Rooms",
    summary = "Publish an event",
    description = "Broadcasts the raw request body to every subscriber of the room. Delivery is best-effort and unconfirmed.",
    params(
        ("room_id" = String, Path, description = "Room key"),
    ),
    request_body(content = String, description = "Opaque payload", content_type = "application/octet-stream"),
    responses(
        (status = 202, description = "Payload accepted for fan-out", body = PublishResponse),
        (status = 400, description = "Invalid room key", body = ErrorResponse),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, BrokerError> {
    let room = RoomId::new(room_id)?;
    let bytes = body.len();
    state.hub.publish(room.clone(), body).await;

    tracing::debug!(%room, bytes, "event published");
    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            room: room.to_string(),
            bytes,
        }),
    ))
}

/// Room routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{room_id}", get(get_room))
        .route("/rooms/{room_id}/events", post(publish_event))
}
