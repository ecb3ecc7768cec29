//! Structural validation of `Settings` control messages.
//!
//! The relay treats payloads as opaque, with one exception: when validation
//! is enabled, a `Settings` message must carry enough structure for the
//! upstream agent to start a conversation, meaning audio encodings it
//! understands and a complete `agent` pipeline. Validation never inspects
//! the semantics of those sections, only their presence and the encoding
//! names.

use serde_json::Value;

use crate::envelope::ErrorCode;

/// Discriminator value identifying a `Settings` message.
pub const SETTINGS_TYPE: &str = "Settings";

/// Audio encodings accepted in `Settings.audio.{input,output}.encoding`.
pub const RECOGNIZED_ENCODINGS: [&str; 5] = ["linear16", "mulaw", "alaw", "flac", "opus"];

/// Why a `Settings` message was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings must be a JSON object")]
    NotAnObject,
    #[error("Settings is missing the \"{0}\" section")]
    MissingSection(&'static str),
    #[error("Settings.agent is missing the \"{0}\" field")]
    MissingAgentField(&'static str),
    #[error("Settings.audio.{direction} is missing an encoding")]
    MissingEncoding { direction: &'static str },
    #[error("unrecognized audio encoding \"{encoding}\" for {direction}")]
    UnknownEncoding {
        direction: &'static str,
        encoding: String,
    },
}

impl SettingsError {
    /// The envelope code reported to the client for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownEncoding { .. } => ErrorCode::AudioFormatError,
            _ => ErrorCode::InvalidSettings,
        }
    }
}

/// Returns the `type` discriminator of a client JSON message, if any.
pub fn message_type(message: &Value) -> Option<&str> {
    message.get("type").and_then(Value::as_str)
}

/// Checks the structure of a `Settings` message.
///
/// Requires `audio` and `agent` objects, recognized input/output encodings,
/// and the `listen`/`think`/`speak` stages of the agent pipeline. The shapes
/// of those stages are left to the upstream service.
pub fn validate_settings(settings: &Value) -> Result<(), SettingsError> {
    let root = settings.as_object().ok_or(SettingsError::NotAnObject)?;

    let audio = root
        .get("audio")
        .and_then(Value::as_object)
        .ok_or(SettingsError::MissingSection("audio"))?;
    let agent = root
        .get("agent")
        .and_then(Value::as_object)
        .ok_or(SettingsError::MissingSection("agent"))?;

    for (direction, section) in [("input", "audio.input"), ("output", "audio.output")] {
        let io = audio
            .get(direction)
            .and_then(Value::as_object)
            .ok_or(SettingsError::MissingSection(section))?;
        let encoding = io
            .get("encoding")
            .and_then(Value::as_str)
            .ok_or(SettingsError::MissingEncoding { direction })?;
        if !RECOGNIZED_ENCODINGS.contains(&encoding) {
            return Err(SettingsError::UnknownEncoding {
                direction,
                encoding: encoding.to_string(),
            });
        }
    }

    for field in ["listen", "think", "speak"] {
        if !agent.contains_key(field) {
            return Err(SettingsError::MissingAgentField(field));
        }
    }

    Ok(())
}
