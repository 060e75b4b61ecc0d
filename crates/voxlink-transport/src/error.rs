/// Errors reported by a transport binding.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The binding could not establish its connection or channel.
    #[error("failed to open channel: {0}")]
    OpenFailed(String),

    /// An operation required an open channel.
    #[error("channel is not open")]
    NotOpen,

    /// The remote end went away.
    #[error("transport disconnected: {0}")]
    Disconnected(String),

    /// A send was attempted but the binding rejected it.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// An I/O error occurred on the underlying connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
