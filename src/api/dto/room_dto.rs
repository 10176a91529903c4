//! Room endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body of `POST /api/v1/rooms/{room_id}/events`.
///
/// Acknowledges that the payload was handed to the hub. It says nothing
/// about how many subscribers received it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    /// Room the payload was published to.
    pub room: String,
    /// Payload size in bytes.
    pub bytes: usize,
}

/// Response body of `GET /api/v1/rooms/{room_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomSubscribersResponse {
    /// Room key.
    pub room: String,
    /// Current number of subscribers (zero when the room does not exist).
    pub subscribers: usize,
}
