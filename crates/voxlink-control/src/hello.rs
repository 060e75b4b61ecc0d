use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::fields::{as_object, optional_bool, optional_str, optional_u32, required_str};

/// Audio parameters exchanged in the hello handshake.
///
/// The client advertises its upstream encoding; the server answers with the
/// downstream sample rate and frame duration. Absent fields mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_duration: Option<u32>,
}

impl AudioParams {
    /// Opus, mono, 16 kHz, 60 ms frames: what a typical device uploads.
    pub fn client_default() -> Self {
        Self {
            format: Some("opus".to_string()),
            sample_rate: Some(16000),
            channels: Some(1),
            frame_duration: Some(60),
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        let obj = as_object(value, "audio_params")?;
        Ok(Self {
            format: optional_str(obj, "format")?.map(str::to_string),
            sample_rate: optional_u32(obj, "sample_rate")?,
            channels: optional_u32(obj, "channels")?,
            frame_duration: optional_u32(obj, "frame_duration")?,
        })
    }
}

/// Optional protocol capabilities announced by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Client speaks MCP over the control channel.
    pub mcp: bool,
    /// Client wants server-side echo cancellation (needs v2 timestamps).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub aec: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            mcp: true,
            aec: false,
        }
    }
}

impl Features {
    fn from_value(value: &Value) -> Result<Self> {
        let obj = as_object(value, "features")?;
        Ok(Self {
            mcp: optional_bool(obj, "mcp")?.unwrap_or(false),
            aec: optional_bool(obj, "aec")?.unwrap_or(false),
        })
    }
}

/// The `hello` message opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    /// Transport name, e.g. `websocket` or `udp`. Required in both directions.
    pub transport: String,
    /// Binary frame layout version (client only).
    pub version: Option<u8>,
    /// Client capabilities (client only).
    pub features: Option<Features>,
    /// Server-assigned session identifier (server only).
    pub session_id: Option<String>,
    /// Audio parameters, if announced.
    pub audio_params: Option<AudioParams>,
}

impl Hello {
    /// Build the client hello.
    pub fn client(
        transport: impl Into<String>,
        version: u8,
        features: Features,
        audio_params: AudioParams,
    ) -> Self {
        Self {
            transport: transport.into(),
            version: Some(version),
            features: Some(features),
            session_id: None,
            audio_params: Some(audio_params),
        }
    }

    /// Build a server hello (used by tests and simulators).
    pub fn server(
        transport: impl Into<String>,
        session_id: impl Into<String>,
        audio_params: Option<AudioParams>,
    ) -> Self {
        Self {
            transport: transport.into(),
            version: None,
            features: None,
            session_id: Some(session_id.into()),
            audio_params,
        }
    }

    pub(crate) fn from_object(obj: &Map<String, Value>) -> Result<Self> {
        let version = optional_u32(obj, "version")?
            .map(|v| {
                u8::try_from(v).map_err(|_| crate::ControlMessageError::InvalidValue {
                    field: "version",
                    value: v.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            transport: required_str(obj, "transport")?.to_string(),
            version,
            features: obj.get("features").map(Features::from_value).transpose()?,
            session_id: optional_str(obj, "session_id")?.map(str::to_string),
            audio_params: obj
                .get("audio_params")
                .map(AudioParams::from_value)
                .transpose()?,
        })
    }

    pub(crate) fn write_fields(&self, obj: &mut Map<String, Value>) {
        if let Some(version) = self.version {
            obj.insert("version".to_string(), Value::from(version));
        }
        if let Some(features) = &self.features {
            obj.insert("features".to_string(), to_value(features));
        }
        obj.insert(
            "transport".to_string(),
            Value::String(self.transport.clone()),
        );
        if let Some(session_id) = &self.session_id {
            obj.insert("session_id".to_string(), Value::String(session_id.clone()));
        }
        if let Some(params) = &self.audio_params {
            obj.insert("audio_params".to_string(), to_value(params));
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    // Plain structs of strings, integers and bools always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}
