use std::fmt;

use voxlink_control::AudioParams;

use crate::config::{DEFAULT_SERVER_FRAME_DURATION, DEFAULT_SERVER_SAMPLE_RATE};

/// Lifecycle of one logical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    #[default]
    Closed,
    /// Channel requested, waiting for the server hello.
    Opening,
    Open,
    /// Teardown in progress; observers see `Closed` next.
    Closing,
}

impl ChannelState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters negotiated for the current session.
///
/// Reset to defaults whenever a channel closes; only a successful hello
/// exchange changes the session id and server rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub server_sample_rate: u32,
    pub server_frame_duration: u32,
    /// Empty until the server hello assigns one.
    pub session_id: String,
    pub error_occurred: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            server_sample_rate: DEFAULT_SERVER_SAMPLE_RATE,
            server_frame_duration: DEFAULT_SERVER_FRAME_DURATION,
            session_id: String::new(),
            error_occurred: false,
        }
    }
}

impl SessionState {
    /// Apply the server's hello. Absent fields keep their current value.
    pub fn negotiate(&mut self, session_id: Option<&str>, params: Option<&AudioParams>) {
        if let Some(params) = params {
            if let Some(rate) = params.sample_rate {
                self.server_sample_rate = rate;
            }
            if let Some(duration) = params.frame_duration {
                self.server_frame_duration = duration;
            }
        }
        self.session_id = session_id.unwrap_or_default().to_string();
    }
}
