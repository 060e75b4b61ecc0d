//! JSON control channel messages for the voxlink session protocol.
//!
//! Every control message is one JSON object with a `type` field, sent as one
//! text frame. This crate builds outbound messages and interprets inbound
//! ones; it holds no session state.

pub mod error;
mod fields;
pub mod hello;
pub mod message;
pub mod mode;

pub use error::{ControlMessageError, Result};
pub use hello::{AudioParams, Features, Hello};
pub use message::{iot_descriptor_messages, parse_json_text, ControlMessage};
pub use mode::{AbortReason, ListeningMode};
