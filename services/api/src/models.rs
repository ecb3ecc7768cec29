//! API Models
//!
//! Payload types for the REST endpoints, annotated for OpenAPI generation
//! with `utoipa`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body of the session token endpoint.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionTokenResponse {
    /// Signed session token, presented back to the server as the
    /// `access_token.<token>` WebSocket subprotocol.
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
