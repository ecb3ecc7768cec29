//! Session authentication for the relay endpoint.
//!
//! Browser WebSocket clients cannot attach arbitrary headers to an upgrade
//! request, so the session token travels as a `Sec-WebSocket-Protocol` entry
//! of the form `access_token.<token>`. The token is checked exactly once,
//! before any upstream work; a rejected upgrade is closed with code 4401 and
//! never reaches the relay core.

mod jwt;

pub use jwt::{Claims, JwtManager, TOKEN_TTL_SECS};

use axum::http::{HeaderMap, header::SEC_WEBSOCKET_PROTOCOL};

/// Subprotocol prefix carrying the session token.
pub const TOKEN_PROTOCOL_PREFIX: &str = "access_token.";

/// WebSocket close code used to reject unauthenticated upgrades.
pub const CLOSE_UNAUTHORIZED: u16 = 4401;

/// Why an upgrade request was refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no access_token subprotocol was offered")]
    MissingToken,
    #[error("session token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Validates the session token offered during the WebSocket handshake.
///
/// Returns the matched subprotocol value so the server can echo it back as
/// the accepted subprotocol. Nothing else is extracted from the token.
pub fn authorize_upgrade(headers: &HeaderMap, jwt: &JwtManager) -> Result<String, AuthError> {
    let offered = headers
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let matched = offered
        .split(',')
        .map(str::trim)
        .find(|protocol| protocol.starts_with(TOKEN_PROTOCOL_PREFIX))
        .ok_or(AuthError::MissingToken)?;

    jwt.validate(&matched[TOKEN_PROTOCOL_PREFIX.len()..])?;
    Ok(matched.to_string())
}
