use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Default upstream endpoint for the Deepgram Voice Agent API.
pub const DEFAULT_AGENT_URL: &str = "wss://agent.deepgram.com/v1/agent/converse";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Server-held Deepgram credential presented on upstream connections.
    pub api_key: Option<String>,
    pub agent_url: String,
    /// Shared secret that session tokens are signed and verified with.
    pub session_secret: Vec<u8>,
    /// Whether to screen client messages before forwarding them upstream.
    pub validate_settings: bool,
    pub metadata_path: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        // Starting without an upstream credential would turn every relay
        // session into an immediate failure, so treat it as fatal here.
        let api_key = std::env::var("DEEPGRAM_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            return Err(ConfigError::MissingVar("DEEPGRAM_API_KEY".to_string()));
        }

        let agent_url =
            std::env::var("DEEPGRAM_AGENT_URL").unwrap_or_else(|_| DEFAULT_AGENT_URL.to_string());

        // Without a configured secret, generate one per process: tokens then
        // only survive as long as the server that issued them.
        let session_secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => rand::random::<[u8; 32]>().to_vec(),
        };

        let validate_settings = std::env::var("VALIDATE_SETTINGS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let metadata_path = std::env::var("METADATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("deepgram.toml"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            api_key,
            agent_url,
            session_secret,
            validate_settings,
            metadata_path,
            log_level,
        })
    }
}
