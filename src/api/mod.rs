//! HTTP layer: route handlers, DTOs, OpenAPI document, router composition.
//!
//! REST endpoints are mounted under `/api/v1`, next to the WebSocket
//! subscription endpoint `/api/v1/ws/{room_id}`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST routes, the WebSocket endpoint,
/// tracing and CORS layers, and Swagger UI when enabled.
pub fn build_app(state: AppState) -> Router {
    let router = build_router().route("/api/v1/ws/{room_id}", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
