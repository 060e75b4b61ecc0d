use crate::kind::FrameVersion;

/// Errors that can occur during frame encoding/decoding.
///
/// Always local to one encode or decode call; a bad frame never poisons the
/// session that produced it.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than the fixed header needs.
    #[error("truncated frame ({available} bytes, header needs {needed})")]
    Truncated { needed: usize, available: usize },

    /// The header's payload_size disagrees with the bytes that follow it.
    #[error("payload size mismatch (header declares {declared} bytes, {actual} present)")]
    SizeMismatch { declared: usize, actual: usize },

    /// The header's type field is neither audio nor JSON.
    #[error("unknown frame type {0}")]
    UnknownType(u16),

    /// The payload does not fit the version's size field or the configured limit.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The layout cannot carry this frame type.
    #[error("frame version {version} cannot carry {frame_type} frames")]
    UnsupportedType {
        version: FrameVersion,
        frame_type: &'static str,
    },

    /// The layout has no length field and cannot be read from a byte stream.
    #[error("frame version {0} has no length field and cannot be stream-framed")]
    Unframed(FrameVersion),

    /// A JSON frame payload was not valid UTF-8.
    #[error("JSON frame payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
