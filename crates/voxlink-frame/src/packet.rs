use bytes::Bytes;

/// One decoded unit of audio.
///
/// `sample_rate` and `frame_duration` are not on the wire; they come from
/// the session's negotiated server parameters. `timestamp` is in the server
/// clock domain and only meaningful for v2 frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStreamPacket {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frame duration in milliseconds.
    pub frame_duration: u32,
    /// Milliseconds, used for server-side echo cancellation alignment.
    pub timestamp: u32,
    /// Codec-opaque payload.
    pub payload: Bytes,
}

impl AudioStreamPacket {
    /// Create a packet.
    pub fn new(sample_rate: u32, frame_duration: u32, timestamp: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            sample_rate,
            frame_duration,
            timestamp,
            payload: payload.into(),
        }
    }
}
