//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the process-wide,
//! read-mostly resources shared by all handlers. Relay sessions themselves
//! keep no cross-session state.

use crate::auth::{JwtManager, TOKEN_TTL_SECS};
use crate::config::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    /// Process-wide stop signal; every relay session holds a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let jwt = JwtManager::new(&config.session_secret, TOKEN_TTL_SECS);
        Self {
            config: Arc::new(config),
            jwt,
            shutdown: CancellationToken::new(),
        }
    }
}
