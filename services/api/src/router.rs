//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, the relay WebSocket endpoint, and OpenAPI
//! documentation.

use crate::{
    handlers,
    models::{ErrorResponse, SessionTokenResponse},
    state::AppState,
    ws::ws_handler,
};

use axum::{Router, routing::get};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::issue_session_token, handlers::metadata),
    components(schemas(SessionTokenResponse, ErrorResponse)),
    tags(
        (name = "Voicegate API", description = "Session tokens and the voice-agent relay")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/session", get(handlers::issue_session_token))
        .route("/api/metadata", get(handlers::metadata))
        .route("/api/voice-agent", get(ws_handler))
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
