//! Session state and protocol engine for the voxlink voice session protocol.
//!
//! [`ProtocolEngine`] owns one logical session over a [`Transport`]. The
//! binding feeds inbound text and binary messages into the engine from its
//! receive path; the engine decodes them, updates [`SessionState`], and
//! invokes the registered observers. Outbound commands are serialized by
//! the control codec and handed back to the binding.
//!
//! ```text
//! Closed -> Opening -> Open -> Closing -> Closed
//! ```
//!
//! [`Transport`]: voxlink_transport::Transport

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod observer;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    SessionConfig, DEFAULT_HELLO_TIMEOUT, DEFAULT_SERVER_FRAME_DURATION,
    DEFAULT_SERVER_SAMPLE_RATE, DEFAULT_TIMEOUT,
};
pub use engine::ProtocolEngine;
pub use error::{ChannelError, Result, SessionError};
pub use liveness::Liveness;
pub use observer::Observers;
pub use state::{ChannelState, SessionState};
