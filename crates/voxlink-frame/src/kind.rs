//! Frame layout versions and payload types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary frame layout negotiated for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum FrameVersion {
    /// Bare payload, no header.
    #[default]
    V1 = 1,
    /// 16-byte header with timestamp.
    V2 = 2,
    /// 4-byte header without timestamp.
    V3 = 3,
}

impl FrameVersion {
    /// Convert to the numeric version advertised in the client hello.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert from the numeric version.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Fixed header length in bytes.
    pub fn header_size(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => crate::codec::V2_HEADER_SIZE,
            Self::V3 => crate::codec::V3_HEADER_SIZE,
        }
    }

    /// Largest payload the version's size field can describe.
    pub fn max_payload(self) -> usize {
        match self {
            Self::V1 => usize::MAX,
            Self::V2 => u32::MAX as usize,
            Self::V3 => u16::MAX as usize,
        }
    }

    /// Whether frames carry a timestamp usable for AEC alignment.
    pub fn has_timestamp(self) -> bool {
        self == Self::V2
    }
}

impl TryFrom<u8> for FrameVersion {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| format!("unsupported frame version {value}"))
    }
}

impl From<FrameVersion> for u8 {
    fn from(version: FrameVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for FrameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u8())
    }
}

/// Payload type carried in the v2/v3 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FrameType {
    /// Codec-opaque audio (Opus in practice).
    Audio = 0,
    /// UTF-8 JSON control message embedded in the audio channel.
    Json = 1,
}

impl FrameType {
    /// Convert to the wire value.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Convert from the wire value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Audio),
            1 => Some(Self::Json),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Json => "json",
        }
    }
}
