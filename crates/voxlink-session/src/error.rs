use std::time::Duration;

use crate::state::ChannelState;

/// Connection-lifecycle failures. Each one ends the current session.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel could not be opened or the handshake failed.
    #[error("failed to open channel: {0}")]
    OpenFailed(String),

    /// No inbound data arrived within the liveness threshold.
    #[error("no inbound data for {0:?}")]
    Timeout(Duration),

    /// The transport reported that the connection went away.
    #[error("transport disconnected: {0}")]
    TransportDisconnected(String),
}

/// Errors returned by [`ProtocolEngine`](crate::ProtocolEngine) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Audio frame encoding failed.
    #[error("frame error: {0}")]
    Frame(#[from] voxlink_frame::FrameError),

    /// A control message could not be built from the caller's input.
    #[error("control message error: {0}")]
    Control(#[from] voxlink_control::ControlMessageError),

    /// The transport binding rejected an operation.
    #[error("transport error: {0}")]
    Transport(#[from] voxlink_transport::TransportError),

    /// The session ended.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// The operation needs an open channel.
    #[error("channel is not open (state: {0})")]
    NotOpen(ChannelState),

    /// An error was reported since the channel was opened.
    #[error("session is unusable until the channel is reopened")]
    Unusable,
}

pub type Result<T> = std::result::Result<T, SessionError>;
