//! Transport collaborator boundary for the voxlink session protocol.
//!
//! The protocol engine never does networking itself. Concrete bindings
//! (WebSocket, MQTT+UDP, ...) implement [`Transport`] and feed inbound bytes
//! back into the engine from their receive path.
//!
//! This crate also ships [`LoopbackTransport`], an in-memory binding that
//! records everything sent through it.

pub mod error;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use loopback::{LoopbackHandle, LoopbackTransport, Sent};
pub use traits::Transport;
