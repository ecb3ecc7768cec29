//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests: session token
//! issuance and the application metadata endpoint. It uses `utoipa` doc
//! comments to generate OpenAPI documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::{
    models::{ErrorResponse, SessionTokenResponse},
    state::AppState,
};

pub enum ApiError {
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// The deployment manifest, of which only the `[meta]` table is served.
#[derive(serde::Deserialize)]
struct Manifest {
    meta: Option<serde_json::Value>,
}

/// Issue a session token for the voice-agent WebSocket.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Freshly issued session token", body = SessionTokenResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn issue_session_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionTokenResponse>, ApiError> {
    let token = state.jwt.issue()?;
    Ok(Json(SessionTokenResponse { token }))
}

/// Application metadata from the deployment manifest.
#[utoipa::path(
    get,
    path = "/api/metadata",
    responses(
        (status = 200, description = "The manifest's [meta] table"),
        (status = 500, description = "Manifest missing or unreadable", body = ErrorResponse)
    )
)]
pub async fn metadata(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let contents = tokio::fs::read_to_string(&state.config.metadata_path).await?;
    let manifest: Manifest = toml::from_str(&contents)?;
    let meta = manifest.meta.ok_or_else(|| {
        anyhow::anyhow!(
            "missing [meta] section in {}",
            state.config.metadata_path.display()
        )
    })?;
    Ok(Json(meta))
}
