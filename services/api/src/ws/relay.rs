//! The bidirectional forwarding engine.
//!
//! Two directions run concurrently per session: client → upstream and
//! upstream → client. Each forwards payload bytes and framing kind exactly
//! as received, preserves per-direction ordering, and exits as soon as the
//! shared cancellation token fires. The first direction to observe a
//! terminal event cancels the token; the other side's `select!` picks that
//! up on its next poll.

use super::{
    error::RelayError,
    session::{ClientSink, send_error},
    upstream::UpstreamSocket,
};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use voicegate_protocol::{
    envelope::{ErrorCode, ErrorEnvelope},
    settings,
};

/// What to do with a client frame after screening.
#[derive(Debug, PartialEq)]
pub(crate) enum Verdict {
    Forward,
    Drop(ErrorEnvelope),
}

/// Screens a client text frame before it is forwarded upstream.
///
/// Only called when validation is enabled: `Settings` messages must pass
/// structural validation; every other type (including `InjectUserMessage`)
/// passes through untouched. A dropped message never reaches the upstream,
/// but dropping is not fatal to the session.
pub(crate) fn screen_text(text: &str) -> Verdict {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Verdict::Drop(ErrorEnvelope::new(
                ErrorCode::ConnectionFailed,
                format!("failed to parse message: {e}"),
            ));
        }
    };
    if settings::message_type(&value) == Some(settings::SETTINGS_TYPE) {
        if let Err(e) = settings::validate_settings(&value) {
            return Verdict::Drop(ErrorEnvelope::new(e.code(), e.to_string()));
        }
    }
    Verdict::Forward
}

/// Screens a client binary frame; empty audio buffers are rejected.
pub(crate) fn screen_binary(payload: &[u8]) -> Verdict {
    if payload.is_empty() {
        Verdict::Drop(ErrorEnvelope::new(
            ErrorCode::AudioFormatError,
            "empty audio frame",
        ))
    } else {
        Verdict::Forward
    }
}

/// Forwards client frames to the upstream socket until the session ends.
///
/// Owns the client's receive half and the upstream's send half; closes the
/// upstream on exit, so the upstream socket is shut exactly once.
pub(crate) async fn client_to_upstream(
    mut client_rx: SplitStream<WebSocket>,
    mut upstream_tx: SplitSink<UpstreamSocket, WsMessage>,
    client_tx: ClientSink,
    cancel: CancellationToken,
    validate: bool,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = client_rx.next() => message,
        };
        match message {
            Some(Ok(Message::Binary(payload))) => {
                if validate {
                    if let Verdict::Drop(envelope) = screen_binary(&payload) {
                        send_error(&client_tx, &envelope).await;
                        continue;
                    }
                }
                if let Err(e) = upstream_tx.send(WsMessage::Binary(payload)).await {
                    if !cancel.is_cancelled() {
                        warn!(error = %e, "Failed to forward audio upstream");
                        send_error(&client_tx, &RelayError::from(e).envelope()).await;
                    }
                    break;
                }
            }
            Some(Ok(Message::Text(text))) => {
                if validate {
                    if let Verdict::Drop(envelope) = screen_text(&text) {
                        send_error(&client_tx, &envelope).await;
                        continue;
                    }
                }
                if let Err(e) = upstream_tx.send(WsMessage::Text(text.as_str().into())).await {
                    if !cancel.is_cancelled() {
                        warn!(error = %e, "Failed to forward message upstream");
                        send_error(&client_tx, &RelayError::from(e).envelope()).await;
                    }
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                debug!("Client closed its end of the session");
                break;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                if !cancel.is_cancelled() {
                    warn!(error = %e, "Error receiving from client");
                }
                break;
            }
        }
    }
    cancel.cancel();
    // Idempotent: the upstream may already have closed the connection.
    let _ = upstream_tx.close().await;
}

/// Forwards upstream frames to the client until the session ends.
///
/// Owns the upstream's receive half and shares the client's send half with
/// error envelope delivery.
pub(crate) async fn upstream_to_client(
    mut upstream_rx: SplitStream<UpstreamSocket>,
    client_tx: ClientSink,
    cancel: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = upstream_rx.next() => message,
        };
        match message {
            Some(Ok(WsMessage::Binary(payload))) => {
                if client_tx
                    .lock()
                    .await
                    .send(Message::Binary(payload))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Some(Ok(WsMessage::Text(text))) => {
                if client_tx
                    .lock()
                    .await
                    .send(Message::Text(text.as_str().into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Some(Ok(WsMessage::Close(_))) | None => {
                debug!("Upstream closed its end of the session");
                break;
            }
            // Ping/Pong and raw frames are handled by the protocol layer.
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                if !cancel.is_cancelled() {
                    warn!(error = %e, "Error receiving from upstream");
                    send_error(&client_tx, &RelayError::from(e).envelope()).await;
                }
                break;
            }
        }
    }
    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordinary_messages_are_forwarded() {
        assert_eq!(
            screen_text(r#"{"type":"InjectUserMessage","content":"hello"}"#),
            Verdict::Forward
        );
        assert_eq!(screen_text(r#"{"type":"SomethingNew"}"#), Verdict::Forward);
    }

    #[test]
    fn valid_settings_are_forwarded() {
        let settings = json!({
            "type": "Settings",
            "audio": {
                "input": { "encoding": "linear16", "sample_rate": 16000 },
                "output": { "encoding": "linear16", "sample_rate": 24000 },
            },
            "agent": { "listen": {}, "think": {}, "speak": {} },
        });
        assert_eq!(screen_text(&settings.to_string()), Verdict::Forward);
    }

    #[test]
    fn invalid_settings_are_dropped_with_a_code() {
        let settings = json!({
            "type": "Settings",
            "audio": {
                "input": { "encoding": "linear16" },
                "output": { "encoding": "linear16" },
            },
            "agent": { "listen": {}, "think": {} },
        });
        match screen_text(&settings.to_string()) {
            Verdict::Drop(envelope) => assert_eq!(envelope.code, ErrorCode::InvalidSettings),
            verdict => panic!("expected a drop, got {verdict:?}"),
        }
    }

    #[test]
    fn unrecognized_encoding_is_an_audio_format_error() {
        let settings = json!({
            "type": "Settings",
            "audio": {
                "input": { "encoding": "wavpack" },
                "output": { "encoding": "linear16" },
            },
            "agent": { "listen": {}, "think": {}, "speak": {} },
        });
        match screen_text(&settings.to_string()) {
            Verdict::Drop(envelope) => assert_eq!(envelope.code, ErrorCode::AudioFormatError),
            verdict => panic!("expected a drop, got {verdict:?}"),
        }
    }

    #[test]
    fn unparseable_text_is_dropped_as_processing_failure() {
        match screen_text("not json at all") {
            Verdict::Drop(envelope) => assert_eq!(envelope.code, ErrorCode::ConnectionFailed),
            verdict => panic!("expected a drop, got {verdict:?}"),
        }
    }

    #[test]
    fn empty_audio_frames_are_dropped() {
        match screen_binary(&[]) {
            Verdict::Drop(envelope) => assert_eq!(envelope.code, ErrorCode::AudioFormatError),
            verdict => panic!("expected a drop, got {verdict:?}"),
        }
        assert_eq!(screen_binary(&[0u8; 100]), Verdict::Forward);
    }
}
