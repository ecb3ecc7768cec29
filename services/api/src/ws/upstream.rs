//! Opens the authenticated connection to the upstream voice-agent endpoint.

use super::error::RelayError;
use crate::config::Config;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::client::IntoClientRequest,
};
use tracing::info;

/// Hard deadline for the upstream handshake. Distinct from the per-read
/// cancellation polling inside the relay loops, which is not a data timeout.
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to the agent endpoint, presenting the server-held API key.
///
/// A connection that cannot be established within [`CONNECT_TIMEOUT`] is
/// fatal to the session; the caller reports it to the client and never
/// retries.
pub(crate) async fn connect(config: &Config) -> Result<UpstreamSocket, RelayError> {
    let api_key = config.api_key.as_deref().ok_or(RelayError::MissingApiKey)?;

    let mut request = config.agent_url.as_str().into_client_request()?;
    request
        .headers_mut()
        .insert("Authorization", format!("Token {api_key}").parse()?);

    let (socket, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(request))
        .await
        .map_err(|_| RelayError::ConnectTimeout)??;
    info!(url = %config.agent_url, "Connected to the agent endpoint");
    Ok(socket)
}
