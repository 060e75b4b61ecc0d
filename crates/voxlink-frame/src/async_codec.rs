//! `tokio_util::codec` adapter for stream transports.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_stream, encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::kind::FrameType;
use crate::packet::AudioStreamPacket;

/// Codec for v2/v3 frames over an `AsyncRead`/`AsyncWrite` byte stream.
#[derive(Debug, Clone)]
pub struct AudioFrameCodec {
    config: FrameConfig,
}

impl AudioFrameCodec {
    /// Create a codec. v1 has no length field and is rejected.
    pub fn new(config: FrameConfig) -> Result<Self> {
        if config.version.header_size() == 0 {
            return Err(FrameError::Unframed(config.version));
        }
        Ok(Self { config })
    }

    /// Current codec configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for AudioFrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        decode_stream(src, self.config.version, self.config.max_payload_size)
    }
}

impl Encoder<Frame> for AudioFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        match frame {
            Frame::Audio(audio) => encode_frame(
                self.config.version,
                FrameType::Audio,
                audio.timestamp,
                audio.payload.as_ref(),
                dst,
            ),
            Frame::Json(text) => {
                encode_frame(self.config.version, FrameType::Json, 0, text.as_bytes(), dst)
            }
        }
    }
}

impl Encoder<AudioStreamPacket> for AudioFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, packet: AudioStreamPacket, dst: &mut BytesMut) -> Result<()> {
        encode_frame(
            self.config.version,
            FrameType::Audio,
            packet.timestamp,
            packet.payload.as_ref(),
            dst,
        )
    }
}
