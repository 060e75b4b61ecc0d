use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};
use crate::kind::{FrameType, FrameVersion};
use crate::packet::AudioStreamPacket;

/// v2 header: version (2) + type (2) + reserved (4) + timestamp (4) + payload_size (4).
pub const V2_HEADER_SIZE: usize = 16;

/// v3 header: type (1) + reserved (1) + payload_size (2).
pub const V3_HEADER_SIZE: usize = 4;

/// Default maximum payload accepted from a byte stream: 64 KiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// Audio content of a decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// Header timestamp (always 0 for v1 and v3).
    pub timestamp: u32,
    /// Codec-opaque payload.
    pub payload: Bytes,
}

impl AudioFrame {
    /// Attach the session's negotiated parameters.
    pub fn into_packet(self, sample_rate: u32, frame_duration: u32) -> AudioStreamPacket {
        AudioStreamPacket {
            sample_rate,
            frame_duration,
            timestamp: self.timestamp,
            payload: self.payload,
        }
    }
}

/// A decoded frame, routed by its type field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Audio for the incoming-audio observer.
    Audio(AudioFrame),
    /// JSON text for the control message codec.
    Json(String),
}

impl Frame {
    /// The frame's payload type.
    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Audio(_) => FrameType::Audio,
            Frame::Json(_) => FrameType::Json,
        }
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> usize {
        match self {
            Frame::Audio(audio) => audio.payload.len(),
            Frame::Json(text) => text.len(),
        }
    }
}

/// Configuration for the audio channel's binary layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Layout version. Default: v1.
    pub version: FrameVersion,
    /// Maximum payload size in bytes. Default: 64 KiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            version: FrameVersion::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl FrameConfig {
    /// Effective payload limit: the configured limit bounded by the size field.
    pub fn payload_limit(&self) -> usize {
        self.max_payload_size.min(self.version.max_payload())
    }
}

/// Encode an audio packet in the requested layout.
///
/// v3 and v1 drop the timestamp.
pub fn encode_audio(packet: &AudioStreamPacket, version: FrameVersion) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(version.header_size() + packet.payload.len());
    encode_frame(
        version,
        FrameType::Audio,
        packet.timestamp,
        packet.payload.as_ref(),
        &mut dst,
    )?;
    Ok(dst.freeze())
}

/// Encode a JSON control message as a binary frame (v2/v3 only).
pub fn encode_json(text: &str, version: FrameVersion) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(version.header_size() + text.len());
    encode_frame(version, FrameType::Json, 0, text.as_bytes(), &mut dst)?;
    Ok(dst.freeze())
}

/// Encode a frame into the wire format, appending to `dst`.
///
/// Wire formats (big-endian):
/// ```text
/// v2: ┌─────────┬────────┬────────────┬─────────────┬──────────────┬─────────┐
///     │ version │ type   │ reserved   │ timestamp   │ payload_size │ payload │
///     │ u16     │ u16    │ u32        │ u32 (ms)    │ u32          │         │
///     └─────────┴────────┴────────────┴─────────────┴──────────────┴─────────┘
/// v3: ┌────────┬──────────┬──────────────┬─────────┐
///     │ type   │ reserved │ payload_size │ payload │
///     │ u8     │ u8       │ u16          │         │
///     └────────┴──────────┴──────────────┴─────────┘
/// v1: payload only
/// ```
pub fn encode_frame(
    version: FrameVersion,
    frame_type: FrameType,
    timestamp: u32,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > version.max_payload() {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: version.max_payload(),
        });
    }

    dst.reserve(version.header_size() + payload.len());
    match version {
        FrameVersion::V1 => {
            if frame_type != FrameType::Audio {
                return Err(FrameError::UnsupportedType {
                    version,
                    frame_type: frame_type.name(),
                });
            }
        }
        FrameVersion::V2 => {
            dst.put_u16(u16::from(version.as_u8()));
            dst.put_u16(frame_type.as_u16());
            dst.put_u32(0);
            dst.put_u32(timestamp);
            dst.put_u32(payload.len() as u32);
        }
        FrameVersion::V3 => {
            dst.put_u8(frame_type.as_u16() as u8);
            dst.put_u8(0);
            dst.put_u16(payload.len() as u16);
        }
    }
    dst.put_slice(payload);
    Ok(())
}

/// Decode one frame from a complete transport message.
///
/// `src` is exactly one binary message as delimited by the transport (for
/// example a WebSocket binary message), so the header's payload_size must
/// match the trailing bytes exactly. Never reads past `src`.
pub fn decode_frame(src: &[u8], version: FrameVersion) -> Result<Frame> {
    if version == FrameVersion::V1 {
        return Ok(Frame::Audio(AudioFrame {
            timestamp: 0,
            payload: Bytes::copy_from_slice(src),
        }));
    }

    let header = Header::parse(src, version)?;
    let body = &src[version.header_size()..];
    if header.payload_size != body.len() {
        return Err(FrameError::SizeMismatch {
            declared: header.payload_size,
            actual: body.len(),
        });
    }

    build_frame(header, Bytes::copy_from_slice(body))
}

/// Decode the next frame from a byte stream buffer.
///
/// Returns `Ok(None)` until the buffer holds a complete frame, then consumes
/// exactly that frame. v1 frames have no length and cannot be stream-framed.
pub fn decode_stream(
    src: &mut BytesMut,
    version: FrameVersion,
    max_payload: usize,
) -> Result<Option<Frame>> {
    if version == FrameVersion::V1 {
        return Err(FrameError::Unframed(version));
    }
    if src.len() < version.header_size() {
        return Ok(None); // Need more data
    }

    let header = Header::parse(&src[..], version)?;
    let limit = max_payload.min(version.max_payload());
    if header.payload_size > limit {
        return Err(FrameError::PayloadTooLarge {
            size: header.payload_size,
            max: limit,
        });
    }

    let total = version.header_size() + header.payload_size;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(version.header_size());
    let payload = src.split_to(header.payload_size).freeze();
    build_frame(header, payload).map(Some)
}

#[derive(Debug, Clone, Copy)]
struct Header {
    frame_type: FrameType,
    timestamp: u32,
    payload_size: usize,
}

impl Header {
    fn parse(src: &[u8], version: FrameVersion) -> Result<Self> {
        let needed = version.header_size();
        if src.len() < needed {
            return Err(FrameError::Truncated {
                needed,
                available: src.len(),
            });
        }

        let mut cursor = &src[..needed];
        let (raw_type, timestamp, payload_size) = match version {
            FrameVersion::V2 => {
                let _version = cursor.get_u16();
                let raw_type = cursor.get_u16();
                let _reserved = cursor.get_u32();
                let timestamp = cursor.get_u32();
                let payload_size = cursor.get_u32() as usize;
                (raw_type, timestamp, payload_size)
            }
            FrameVersion::V3 => {
                let raw_type = u16::from(cursor.get_u8());
                let _reserved = cursor.get_u8();
                let payload_size = cursor.get_u16() as usize;
                (raw_type, 0, payload_size)
            }
            FrameVersion::V1 => return Err(FrameError::Unframed(version)),
        };

        let frame_type = FrameType::from_u16(raw_type).ok_or(FrameError::UnknownType(raw_type))?;

        Ok(Self {
            frame_type,
            timestamp,
            payload_size,
        })
    }
}

fn build_frame(header: Header, payload: Bytes) -> Result<Frame> {
    match header.frame_type {
        FrameType::Audio => Ok(Frame::Audio(AudioFrame {
            timestamp: header.timestamp,
            payload,
        })),
        FrameType::Json => Ok(Frame::Json(String::from_utf8(payload.to_vec())?)),
    }
}
