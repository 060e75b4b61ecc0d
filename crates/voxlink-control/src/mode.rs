use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ControlMessageError;

/// How a listening turn ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListeningMode {
    /// The server ends the turn when it detects end of speech.
    AutoStop,
    /// The client ends the turn with an explicit stop.
    ManualStop,
    /// Full duplex. Requires acoustic echo cancellation on the device or server.
    Realtime,
}

impl ListeningMode {
    /// Wire value of the `mode` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoStop => "auto",
            Self::ManualStop => "manual",
            Self::Realtime => "realtime",
        }
    }
}

impl FromStr for ListeningMode {
    type Err = ControlMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::AutoStop),
            "manual" => Ok(Self::ManualStop),
            "realtime" => Ok(Self::Realtime),
            other => Err(ControlMessageError::InvalidValue {
                field: "mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ListeningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why playback is being interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// No specific reason; the `reason` field is omitted on the wire.
    #[default]
    None,
    /// The local wake word fired while the assistant was speaking.
    WakeWordDetected,
}

impl AbortReason {
    /// Wire value of the `reason` field, if any.
    pub fn as_wire(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::WakeWordDetected => Some("wake_word_detected"),
        }
    }
}

impl FromStr for AbortReason {
    type Err = ControlMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "wake_word_detected" => Ok(Self::WakeWordDetected),
            other => Err(ControlMessageError::InvalidValue {
                field: "reason",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listening_mode_wire_values() {
        for mode in [
            ListeningMode::AutoStop,
            ListeningMode::ManualStop,
            ListeningMode::Realtime,
        ] {
            assert_eq!(mode.as_str().parse::<ListeningMode>().unwrap(), mode);
        }
        assert!(matches!(
            "push_to_talk".parse::<ListeningMode>(),
            Err(ControlMessageError::InvalidValue { field: "mode", .. })
        ));
    }

    #[test]
    fn abort_reason_wire_values() {
        assert_eq!(AbortReason::None.as_wire(), None);
        assert_eq!(
            AbortReason::WakeWordDetected.as_wire(),
            Some("wake_word_detected")
        );
        assert_eq!(
            "wake_word_detected".parse::<AbortReason>().unwrap(),
            AbortReason::WakeWordDetected
        );
    }
}
