//! Control message kinds and their JSON shapes.
//!
//! | kind | `type` | other fields |
//! |---|---|---|
//! | hello | `hello` | `transport`, `version`, `features`, `session_id`, `audio_params` |
//! | listen start | `listen` | `state: "start"`, `mode` |
//! | listen stop | `listen` | `state: "stop"` |
//! | wake word | `listen` | `state: "detect"`, `text` |
//! | abort | `abort` | optional `reason` |
//! | IoT descriptors | `iot` | `update: true`, `descriptors: [..]` |
//! | IoT states | `iot` | `update: true`, `states` |
//! | MCP | `mcp` | `payload` |
//! | goodbye | `goodbye` | optional `session_id` |
//! | error | `error` | `message` |
//!
//! Outbound messages all carry the current `session_id`, empty before the
//! handshake completes.

use serde_json::{Map, Value};

use crate::error::{ControlMessageError, Result};
use crate::fields::{as_object, optional_str, required, required_str};
use crate::hello::Hello;
use crate::mode::{AbortReason, ListeningMode};

/// A control channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Session negotiation, sent by both sides.
    Hello(Hello),
    /// Begin a listening turn.
    ListenStart {
        session_id: String,
        mode: ListeningMode,
    },
    /// End the current listening turn.
    ListenStop { session_id: String },
    /// The local wake word fired.
    WakeWordDetected {
        session_id: String,
        wake_word: String,
    },
    /// Interrupt playback.
    Abort {
        session_id: String,
        reason: AbortReason,
    },
    /// Declare IoT device capabilities.
    IotDescriptors {
        session_id: String,
        descriptors: Vec<Value>,
    },
    /// Report IoT device states.
    IotStates { session_id: String, states: Value },
    /// Opaque MCP payload passthrough.
    Mcp { session_id: String, payload: Value },
    /// Channel teardown. A missing session id applies to any session.
    Goodbye { session_id: Option<String> },
    /// Server-side fault notice.
    Error { message: String },
    /// Any other message type (tts, stt, llm, ...), left to the application.
    Other { kind: String, body: Value },
}

impl ControlMessage {
    /// The `type` field value.
    pub fn kind(&self) -> &str {
        match self {
            Self::Hello(_) => "hello",
            Self::ListenStart { .. } | Self::ListenStop { .. } | Self::WakeWordDetected { .. } => {
                "listen"
            }
            Self::Abort { .. } => "abort",
            Self::IotDescriptors { .. } | Self::IotStates { .. } => "iot",
            Self::Mcp { .. } => "mcp",
            Self::Goodbye { .. } => "goodbye",
            Self::Error { .. } => "error",
            Self::Other { kind, .. } => kind.as_str(),
        }
    }

    /// Parse one control message from its JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Interpret an already-parsed JSON tree.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = as_object(value, "message")?;
        let kind = required_str(obj, "type")?;
        let session_id =
            || optional_str(obj, "session_id").map(|id| id.unwrap_or_default().to_string());

        match kind {
            "hello" => Ok(Self::Hello(Hello::from_object(obj)?)),
            "listen" => {
                let session_id = session_id()?;
                match required_str(obj, "state")? {
                    "start" => Ok(Self::ListenStart {
                        session_id,
                        mode: required_str(obj, "mode")?.parse::<ListeningMode>()?,
                    }),
                    "stop" => Ok(Self::ListenStop { session_id }),
                    "detect" => Ok(Self::WakeWordDetected {
                        session_id,
                        wake_word: required_str(obj, "text")?.to_string(),
                    }),
                    other => Err(ControlMessageError::InvalidValue {
                        field: "state",
                        value: other.to_string(),
                    }),
                }
            }
            "abort" => Ok(Self::Abort {
                session_id: session_id()?,
                reason: optional_str(obj, "reason")?
                    .map(str::parse::<AbortReason>)
                    .transpose()?
                    .unwrap_or_default(),
            }),
            "iot" => {
                let session_id = session_id()?;
                if let Some(descriptors) = obj.get("descriptors") {
                    let descriptors = descriptors
                        .as_array()
                        .ok_or(ControlMessageError::TypeMismatch {
                            field: "descriptors",
                            expected: "an array",
                        })?
                        .clone();
                    Ok(Self::IotDescriptors {
                        session_id,
                        descriptors,
                    })
                } else {
                    Ok(Self::IotStates {
                        session_id,
                        states: required(obj, "states")?.clone(),
                    })
                }
            }
            "mcp" => Ok(Self::Mcp {
                session_id: session_id()?,
                payload: required(obj, "payload")?.clone(),
            }),
            "goodbye" => Ok(Self::Goodbye {
                session_id: optional_str(obj, "session_id")?
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            }),
            "error" => Ok(Self::Error {
                message: required_str(obj, "message")?.to_string(),
            }),
            other => Ok(Self::Other {
                kind: other.to_string(),
                body: value.clone(),
            }),
        }
    }

    /// Build the JSON tree for this message.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        match self {
            Self::Hello(hello) => {
                obj.insert("type".into(), "hello".into());
                hello.write_fields(&mut obj);
            }
            Self::ListenStart { session_id, mode } => {
                listen(&mut obj, session_id, "start");
                obj.insert("mode".into(), mode.as_str().into());
            }
            Self::ListenStop { session_id } => {
                listen(&mut obj, session_id, "stop");
            }
            Self::WakeWordDetected {
                session_id,
                wake_word,
            } => {
                listen(&mut obj, session_id, "detect");
                obj.insert("text".into(), wake_word.as_str().into());
            }
            Self::Abort { session_id, reason } => {
                header(&mut obj, session_id, "abort");
                if let Some(reason) = reason.as_wire() {
                    obj.insert("reason".into(), reason.into());
                }
            }
            Self::IotDescriptors {
                session_id,
                descriptors,
            } => {
                header(&mut obj, session_id, "iot");
                obj.insert("update".into(), true.into());
                obj.insert("descriptors".into(), Value::Array(descriptors.clone()));
            }
            Self::IotStates { session_id, states } => {
                header(&mut obj, session_id, "iot");
                obj.insert("update".into(), true.into());
                obj.insert("states".into(), states.clone());
            }
            Self::Mcp {
                session_id,
                payload,
            } => {
                header(&mut obj, session_id, "mcp");
                obj.insert("payload".into(), payload.clone());
            }
            Self::Goodbye { session_id } => {
                if let Some(session_id) = session_id {
                    obj.insert("session_id".into(), session_id.as_str().into());
                }
                obj.insert("type".into(), "goodbye".into());
            }
            Self::Error { message } => {
                obj.insert("type".into(), "error".into());
                obj.insert("message".into(), message.as_str().into());
            }
            Self::Other { body, .. } => return body.clone(),
        }
        Value::Object(obj)
    }

    /// Serialize to the JSON text sent on the wire.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

fn header(obj: &mut Map<String, Value>, session_id: &str, kind: &str) {
    obj.insert("session_id".into(), session_id.into());
    obj.insert("type".into(), kind.into());
}

fn listen(obj: &mut Map<String, Value>, session_id: &str, state: &str) {
    header(obj, session_id, "listen");
    obj.insert("state".into(), state.into());
}

/// Parse caller-supplied JSON text (IoT states, MCP payloads).
pub fn parse_json_text(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Split an IoT descriptor array into one message per descriptor.
///
/// Descriptor sets can be large; sending them one at a time keeps each
/// message within the transport's frame budget.
pub fn iot_descriptor_messages(session_id: &str, descriptors: &str) -> Result<Vec<ControlMessage>> {
    let value = parse_json_text(descriptors)?;
    let items = value.as_array().ok_or(ControlMessageError::TypeMismatch {
        field: "descriptors",
        expected: "an array",
    })?;

    Ok(items
        .iter()
        .map(|descriptor| ControlMessage::IotDescriptors {
            session_id: session_id.to_string(),
            descriptors: vec![descriptor.clone()],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::hello::{AudioParams, Features};

    fn parse(value: Value) -> Result<ControlMessage> {
        ControlMessage::from_value(&value)
    }

    #[test]
    fn listen_start_shape() {
        let msg = ControlMessage::ListenStart {
            session_id: "s1".to_string(),
            mode: ListeningMode::Realtime,
        };
        assert_eq!(
            msg.to_value(),
            json!({"session_id": "s1", "type": "listen", "state": "start", "mode": "realtime"})
        );
        assert_eq!(ControlMessage::parse(&msg.to_json()).unwrap(), msg);
    }

    #[test]
    fn listen_start_without_mode_is_missing_field() {
        let err = parse(json!({"session_id": "s1", "type": "listen", "state": "start"})).unwrap_err();
        assert!(matches!(err, ControlMessageError::MissingField("mode")));
    }

    #[test]
    fn listen_stop_and_detect_shapes() {
        let stop = ControlMessage::ListenStop {
            session_id: "s1".to_string(),
        };
        assert_eq!(
            stop.to_value(),
            json!({"session_id": "s1", "type": "listen", "state": "stop"})
        );

        let detect = ControlMessage::WakeWordDetected {
            session_id: "s1".to_string(),
            wake_word: "hi esp".to_string(),
        };
        assert_eq!(
            detect.to_value(),
            json!({"session_id": "s1", "type": "listen", "state": "detect", "text": "hi esp"})
        );
        assert_eq!(parse(detect.to_value()).unwrap(), detect);
    }

    #[test]
    fn wake_word_requires_text() {
        let err = parse(json!({"type": "listen", "state": "detect"})).unwrap_err();
        assert!(matches!(err, ControlMessageError::MissingField("text")));
    }

    #[test]
    fn unknown_listen_state() {
        let err = parse(json!({"type": "listen", "state": "pause"})).unwrap_err();
        assert!(matches!(
            err,
            ControlMessageError::InvalidValue { field: "state", .. }
        ));
    }

    #[test]
    fn abort_reason_optional_on_wire() {
        let plain = ControlMessage::Abort {
            session_id: "s1".to_string(),
            reason: AbortReason::None,
        };
        assert_eq!(plain.to_value(), json!({"session_id": "s1", "type": "abort"}));

        let wake = ControlMessage::Abort {
            session_id: "s1".to_string(),
            reason: AbortReason::WakeWordDetected,
        };
        assert_eq!(
            wake.to_value(),
            json!({"session_id": "s1", "type": "abort", "reason": "wake_word_detected"})
        );
        assert_eq!(parse(plain.to_value()).unwrap(), plain);
        assert_eq!(parse(wake.to_value()).unwrap(), wake);
    }

    #[test]
    fn abort_reason_type_checked() {
        let err = parse(json!({"type": "abort", "reason": 1})).unwrap_err();
        assert!(matches!(
            err,
            ControlMessageError::TypeMismatch { field: "reason", .. }
        ));
    }

    #[test]
    fn iot_states_embed_json() {
        let msg = ControlMessage::IotStates {
            session_id: "s1".to_string(),
            states: json!([{"name": "Speaker", "state": {"volume": 80}}]),
        };
        assert_eq!(
            msg.to_value(),
            json!({
                "session_id": "s1",
                "type": "iot",
                "update": true,
                "states": [{"name": "Speaker", "state": {"volume": 80}}]
            })
        );
        assert_eq!(parse(msg.to_value()).unwrap(), msg);
    }

    #[test]
    fn iot_without_payload_is_missing_field() {
        let err = parse(json!({"type": "iot", "update": true})).unwrap_err();
        assert!(matches!(err, ControlMessageError::MissingField("states")));
    }

    #[test]
    fn iot_descriptors_split_per_item() {
        let messages = iot_descriptor_messages(
            "s1",
            r#"[{"name":"Speaker"},{"name":"Lamp"}]"#,
        )
        .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].to_value(),
            json!({
                "session_id": "s1",
                "type": "iot",
                "update": true,
                "descriptors": [{"name": "Lamp"}]
            })
        );
    }

    #[test]
    fn iot_descriptors_must_be_array() {
        let err = iot_descriptor_messages("s1", r#"{"name":"Speaker"}"#).unwrap_err();
        assert!(matches!(
            err,
            ControlMessageError::TypeMismatch {
                field: "descriptors",
                ..
            }
        ));
        assert!(matches!(
            iot_descriptor_messages("s1", "[not json"),
            Err(ControlMessageError::InvalidJson(_))
        ));
    }

    #[test]
    fn mcp_payload_passthrough() {
        let payload = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"});
        let msg = ControlMessage::Mcp {
            session_id: "s1".to_string(),
            payload: payload.clone(),
        };
        assert_eq!(
            msg.to_value(),
            json!({"session_id": "s1", "type": "mcp", "payload": payload})
        );

        let err = parse(json!({"type": "mcp"})).unwrap_err();
        assert!(matches!(err, ControlMessageError::MissingField("payload")));
    }

    #[test]
    fn goodbye_and_error() {
        assert_eq!(
            parse(json!({"type": "goodbye", "session_id": "s1"})).unwrap(),
            ControlMessage::Goodbye {
                session_id: Some("s1".to_string())
            }
        );
        assert_eq!(
            parse(json!({"type": "goodbye", "session_id": ""})).unwrap(),
            ControlMessage::Goodbye { session_id: None }
        );
        assert_eq!(
            parse(json!({"type": "error", "message": "quota exceeded"})).unwrap(),
            ControlMessage::Error {
                message: "quota exceeded".to_string()
            }
        );
        assert!(matches!(
            parse(json!({"type": "error"})),
            Err(ControlMessageError::MissingField("message"))
        ));
    }

    #[test]
    fn client_hello_shape() {
        let hello = ControlMessage::Hello(Hello::client(
            "websocket",
            3,
            Features::default(),
            AudioParams::client_default(),
        ));
        assert_eq!(
            hello.to_value(),
            json!({
                "type": "hello",
                "version": 3,
                "features": {"mcp": true},
                "transport": "websocket",
                "audio_params": {
                    "format": "opus",
                    "sample_rate": 16000,
                    "channels": 1,
                    "frame_duration": 60
                }
            })
        );
    }

    #[test]
    fn unknown_kinds_pass_through() {
        let body = json!({"type": "tts", "state": "sentence_start", "text": "hello"});
        let msg = parse(body.clone()).unwrap();
        assert_eq!(msg.kind(), "tts");
        assert_eq!(msg.to_value(), body);
    }

    #[test]
    fn type_field_checks() {
        assert!(matches!(
            parse(json!({"session_id": "s1"})),
            Err(ControlMessageError::MissingField("type"))
        ));
        assert!(matches!(
            parse(json!({"type": 5})),
            Err(ControlMessageError::TypeMismatch { field: "type", .. })
        ));
        assert!(matches!(
            parse(json!(["hello"])),
            Err(ControlMessageError::TypeMismatch { field: "message", .. })
        ));
        assert!(matches!(
            ControlMessage::parse("{oops"),
            Err(ControlMessageError::InvalidJson(_))
        ));
    }
}
