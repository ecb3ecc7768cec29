//! Translates internal failures into client-facing error envelopes.

use axum::http::header::InvalidHeaderValue;
use tokio_tungstenite::tungstenite;
use voicegate_protocol::envelope::{ErrorCode, ErrorEnvelope};

/// Failures that can terminate (or interrupt) a relay session.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no Deepgram API key is configured")]
    MissingApiKey,
    #[error("timed out connecting to the agent endpoint")]
    ConnectTimeout,
    #[error("upstream connection failed: {0}")]
    Upstream(#[from] tungstenite::Error),
    #[error("failed to build the upstream request: {0}")]
    Request(#[from] InvalidHeaderValue),
}

impl RelayError {
    /// The machine-readable code surfaced to the client for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingApiKey => ErrorCode::MissingApiKey,
            Self::ConnectTimeout | Self::Upstream(_) => ErrorCode::ProviderError,
            Self::Request(_) => ErrorCode::ConnectionFailed,
        }
    }

    /// Renders this failure as the envelope delivered to the client.
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code(), self.to_string())
    }
}
