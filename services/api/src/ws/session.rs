//! Manages the relay connection lifecycle, from upgrade to teardown.

use super::{relay, upstream};
use crate::{
    auth::{self, CLOSE_UNAUTHORIZED},
    state::AppState,
};
use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use voicegate_protocol::envelope::ErrorEnvelope;

/// The client's send half, shared between the outbound direction and
/// best-effort error envelope delivery.
pub(crate) type ClientSink = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Lifecycle phases of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionPhase {
    Connecting,
    Relaying,
    Closing,
    Closed,
}

/// One client ↔ upstream pairing and its shared lifecycle state.
///
/// The sockets themselves are owned by the forwarding directions; the
/// session tracks the phase, the start instant, and the cancellation token
/// both directions observe. The token is a child of the process-wide
/// shutdown signal, so a server shutdown tears down every live session.
pub(crate) struct RelaySession {
    id: Uuid,
    phase: SessionPhase,
    started: Instant,
    cancel: CancellationToken,
}

impl RelaySession {
    fn new(shutdown: &CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Connecting,
            started: Instant::now(),
            cancel: shutdown.child_token(),
        }
    }

    fn advance(&mut self, next: SessionPhase) {
        debug!(from = ?self.phase, to = ?next, "Session phase change");
        self.phase = next;
    }
}

/// Axum handler to upgrade an HTTP connection to the relay WebSocket.
///
/// The session token is validated here, before any upstream work. A missing
/// or invalid token still accepts the upgrade, but only to close it
/// immediately with code 4401, since an HTTP rejection could not carry a
/// WebSocket close code to the page.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    match auth::authorize_upgrade(&headers, &state.jwt) {
        Ok(protocol) => ws
            .protocols([protocol])
            .on_upgrade(move |socket| handle_socket(socket, state)),
        Err(e) => {
            warn!(error = %e, "Rejecting unauthenticated upgrade");
            ws.on_upgrade(reject_socket)
        }
    }
}

/// Closes an unauthenticated socket with the 4401 policy code.
async fn reject_socket(mut socket: WebSocket) {
    let close = Message::Close(Some(CloseFrame {
        code: CLOSE_UNAUTHORIZED,
        reason: "Unauthorized".into(),
    }));
    let _ = socket.send(close).await;
}

/// Main handler for an authenticated relay connection.
///
/// Connects the upstream leg, then runs both forwarding directions to
/// completion. Whichever side terminates first cancels the shared token;
/// both directions are joined before the sockets are released, so nothing
/// outlives the session.
#[instrument(name = "relay_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut session = RelaySession::new(&state.shutdown);
    tracing::Span::current().record("session_id", session.id.to_string());
    info!("Client connected to the voice-agent relay");

    let (client_tx, client_rx) = socket.split();
    let client_tx: ClientSink = Arc::new(Mutex::new(client_tx));

    let upstream_socket = match upstream::connect(&state.config).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!(error = %e, "Could not establish the upstream connection");
            send_error(&client_tx, &e.envelope()).await;
            close_client(&client_tx).await;
            session.advance(SessionPhase::Closed);
            return;
        }
    };
    session.advance(SessionPhase::Relaying);

    let (upstream_tx, upstream_rx) = upstream_socket.split();

    let inbound = tokio::spawn(relay::client_to_upstream(
        client_rx,
        upstream_tx,
        client_tx.clone(),
        session.cancel.clone(),
        state.config.validate_settings,
    ));
    let outbound = tokio::spawn(relay::upstream_to_client(
        upstream_rx,
        client_tx.clone(),
        session.cancel.clone(),
    ));

    let _ = tokio::join!(inbound, outbound);

    session.advance(SessionPhase::Closing);
    close_client(&client_tx).await;
    session.advance(SessionPhase::Closed);
    info!(elapsed = ?session.started.elapsed(), "Session closed");
}

/// Best-effort delivery of an error envelope to the client.
///
/// The session is already terminating, or the offending message has been
/// dropped, so a failed delivery is logged and swallowed.
pub(crate) async fn send_error(client_tx: &ClientSink, envelope: &ErrorEnvelope) {
    let payload = match serde_json::to_string(envelope) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Failed to serialize error envelope");
            return;
        }
    };
    if let Err(e) = client_tx.lock().await.send(Message::Text(payload.into())).await {
        debug!(error = %e, "Failed to deliver error envelope");
    }
}

/// Sends the closing handshake to the client, tolerating sockets that are
/// already gone.
async fn close_client(client_tx: &ClientSink) {
    let _ = client_tx.lock().await.send(Message::Close(None)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_start_connecting_and_advance_in_order() {
        let shutdown = CancellationToken::new();
        let mut session = RelaySession::new(&shutdown);
        assert_eq!(session.phase, SessionPhase::Connecting);

        session.advance(SessionPhase::Relaying);
        session.advance(SessionPhase::Closing);
        session.advance(SessionPhase::Closed);
        assert_eq!(session.phase, SessionPhase::Closed);
    }

    #[test]
    fn shutdown_signal_cancels_sessions() {
        let shutdown = CancellationToken::new();
        let session = RelaySession::new(&shutdown);
        assert!(!session.cancel.is_cancelled());

        shutdown.cancel();
        assert!(session.cancel.is_cancelled());
    }

    #[test]
    fn session_cancellation_is_idempotent_and_local() {
        let shutdown = CancellationToken::new();
        let session = RelaySession::new(&shutdown);

        session.cancel.cancel();
        session.cancel.cancel();
        assert!(session.cancel.is_cancelled());
        // One session ending must not stop the server or its siblings.
        assert!(!shutdown.is_cancelled());
    }
}
