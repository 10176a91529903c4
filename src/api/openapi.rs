//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::dto::{PublishResponse, RoomSubscribersResponse};
use super::handlers::{rooms, system};
use crate::error::{ErrorBody, ErrorResponse};
use crate::hub::{DirectoryStats, RoomStats};

/// Generated OpenAPI specification, served by Swagger UI when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lending-realtime",
        description = "Room-scoped broadcast broker. Subscribe with a WebSocket at `/api/v1/ws/{room_id}`."
    ),
    paths(
        system::health_handler,
        rooms::list_rooms,
        rooms::get_room,
        rooms::publish_event,
    ),
    components(schemas(
        system::HealthResponse,
        DirectoryStats,
        RoomStats,
        PublishResponse,
        RoomSubscribersResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Rooms", description = "Room directory and publishing"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        assert!(paths.contains(&"/health"));
        assert!(paths.contains(&"/api/v1/rooms"));
        assert!(paths.contains(&"/api/v1/rooms/{room_id}"));
        assert!(paths.contains(&"/api/v1/rooms/{room_id}/events"));
    }
}
