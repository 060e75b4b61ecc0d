//! Binary audio frame layouts for the voxlink session protocol.
//!
//! Three layouts share the audio channel, selected by session negotiation
//! rather than sniffed from the bytes:
//! - v1: no header, the whole binary message is an audio payload
//! - v2: 16-byte header with a millisecond timestamp for server-side AEC
//! - v3: compact 4-byte header without timestamp
//!
//! All header fields are big-endian.

pub mod codec;
pub mod error;
pub mod kind;
pub mod packet;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{
    decode_frame, decode_stream, encode_audio, encode_frame, encode_json, AudioFrame, Frame,
    FrameConfig, DEFAULT_MAX_PAYLOAD, V2_HEADER_SIZE, V3_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use kind::{FrameType, FrameVersion};
pub use packet::AudioStreamPacket;
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::AudioFrameCodec;
