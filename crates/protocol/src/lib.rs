//! Wire-level types for the voicegate relay.
//!
//! Everything the relay puts on the wire itself (as opposed to the opaque
//! payloads it forwards) lives here, shared between the API service and any
//! native client:
//!
//! - `envelope`: the structured error notification sent to browser clients.
//! - `settings`: structural validation of `Settings` control messages.

pub mod envelope;
pub mod settings;
