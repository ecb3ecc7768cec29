//! WebSocket Relay
//!
//! This module contains the core logic for relaying a browser session to the
//! upstream voice-agent service. It is structured into submodules for clarity:
//!
//! - `error`: Maps internal failures onto the client-facing error envelope.
//! - `relay`: The two forwarding directions and per-message screening.
//! - `session`: Manages the connection lifecycle, from upgrade to teardown.
//! - `upstream`: Opens the authenticated connection to the agent endpoint.

mod error;
mod relay;
pub mod session;
mod upstream;

pub use session::ws_handler;
