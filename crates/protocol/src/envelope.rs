//! The structured error notification delivered to browser clients.

use serde::{Deserialize, Serialize};

/// Machine-readable failure codes surfaced to the client.
///
/// This set is closed: clients switch on these values, so new failure modes
/// must map onto an existing code rather than extend the enum casually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The server has no upstream credential available.
    MissingApiKey,
    /// The upstream agent connection failed or misbehaved.
    ProviderError,
    /// Generic session-establishment or message-processing failure.
    ConnectionFailed,
    /// Malformed or empty audio, or an unrecognized codec name.
    AudioFormatError,
    /// A structurally invalid `Settings` message.
    InvalidSettings,
}

/// Error notification sent to the client, best-effort, before a message is
/// dropped or a session is torn down.
///
/// Serializes as `{"type":"Error","description":...,"code":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Error")]
pub struct ErrorEnvelope {
    pub description: String,
    pub code: ErrorCode,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_wire_shape() {
        let envelope = ErrorEnvelope::new(ErrorCode::ProviderError, "upstream connection failed");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "type": "Error",
                "description": "upstream connection failed",
                "code": "PROVIDER_ERROR",
            })
        );
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let cases = [
            (ErrorCode::MissingApiKey, "MISSING_API_KEY"),
            (ErrorCode::ProviderError, "PROVIDER_ERROR"),
            (ErrorCode::ConnectionFailed, "CONNECTION_FAILED"),
            (ErrorCode::AudioFormatError, "AUDIO_FORMAT_ERROR"),
            (ErrorCode::InvalidSettings, "INVALID_SETTINGS"),
        ];
        for (code, expected) in cases {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(expected));
        }
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = ErrorEnvelope::new(ErrorCode::InvalidSettings, "missing agent section");
        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: ErrorEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, envelope);
    }
}
