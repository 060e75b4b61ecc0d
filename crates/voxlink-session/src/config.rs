use std::time::Duration;

use serde::{Deserialize, Serialize};
use voxlink_control::{AudioParams, Features, Hello};
use voxlink_frame::FrameConfig;

/// Liveness threshold: a session with no inbound data for longer is dead.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How long the engine waits in `Opening` for the server hello.
pub const DEFAULT_HELLO_TIMEOUT: Duration = Duration::from_secs(10);

/// Downstream sample rate assumed until the server says otherwise.
pub const DEFAULT_SERVER_SAMPLE_RATE: u32 = 24000;

/// Downstream frame duration (ms) assumed until the server says otherwise.
pub const DEFAULT_SERVER_FRAME_DURATION: u32 = 60;

/// Configuration for one [`ProtocolEngine`](crate::ProtocolEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Liveness threshold. Default: 120 seconds.
    pub timeout: Duration,
    /// Maximum wait for the server hello. Default: 10 seconds.
    pub hello_timeout: Duration,
    /// Hello `transport` field. A server hello naming another transport
    /// fails the open. Default: `websocket`.
    pub transport_name: String,
    /// Audio channel layout; the version is advertised in the client hello.
    pub frame: FrameConfig,
    /// Upstream audio parameters advertised in the client hello.
    pub audio_params: AudioParams,
    /// Capabilities advertised in the client hello.
    pub features: Features,
    /// Send a goodbye message before closing the channel. Default: false.
    pub send_goodbye_on_close: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            hello_timeout: DEFAULT_HELLO_TIMEOUT,
            transport_name: "websocket".to_string(),
            frame: FrameConfig::default(),
            audio_params: AudioParams::client_default(),
            features: Features::default(),
            send_goodbye_on_close: false,
        }
    }
}

impl SessionConfig {
    /// The hello message this configuration announces.
    pub fn client_hello(&self) -> Hello {
        Hello::client(
            self.transport_name.clone(),
            self.frame.version.as_u8(),
            self.features,
            self.audio_params.clone(),
        )
    }
}
