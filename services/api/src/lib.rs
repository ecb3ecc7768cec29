//! Voicegate API Library Crate
//!
//! This library contains all the core logic for the voicegate web service:
//! session authentication, the REST endpoints, and the WebSocket relay to
//! the upstream voice-agent API. The `main.rs` binary is a thin wrapper
//! around this library.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
