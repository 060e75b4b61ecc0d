//! Transport-agnostic voice assistant session protocol.
//!
//! voxlink multiplexes a real-time audio stream and a JSON control channel
//! between a voice-assistant device and its cloud service over one logical
//! connection. Concrete transports (WebSocket, MQTT+UDP) plug in through a
//! small trait; everything above it is pure protocol.
//!
//! # Crate Structure
//!
//! - [`transport`]: Transport collaborator trait and the in-memory loopback binding
//! - [`frame`]: Binary audio frame layouts (v1, v2, v3)
//! - [`control`]: JSON control messages (hello, listen, abort, IoT, MCP, goodbye)
//! - [`session`]: Session state and the protocol engine

/// Re-export transport types.
pub mod transport {
    pub use voxlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use voxlink_frame::*;
}

/// Re-export control message types.
pub mod control {
    pub use voxlink_control::*;
}

/// Re-export session types.
pub mod session {
    pub use voxlink_session::*;
}
