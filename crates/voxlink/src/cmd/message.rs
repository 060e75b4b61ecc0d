use serde_json::Value;
use voxlink_control::{
    iot_descriptor_messages, parse_json_text, AbortReason, AudioParams, ControlMessage, Features,
    Hello, ListeningMode,
};

use crate::cmd::{MessageArgs, MessageKind, ModeArg};
use crate::exit::{control_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_messages, OutputFormat};

pub fn run(args: MessageArgs, format: OutputFormat) -> CliResult<i32> {
    let messages = build(&args)?;
    let values: Vec<Value> = messages.iter().map(ControlMessage::to_value).collect();
    print_messages(&values, format);
    Ok(SUCCESS)
}

fn build(args: &MessageArgs) -> CliResult<Vec<ControlMessage>> {
    let session_id = args.session_id.clone();
    let message = match args.kind {
        MessageKind::Hello => ControlMessage::Hello(Hello::client(
            "websocket",
            args.frame_version.as_u8(),
            Features {
                mcp: true,
                aec: args.aec,
            },
            AudioParams::client_default(),
        )),
        MessageKind::ListenStart => ControlMessage::ListenStart {
            session_id,
            mode: listening_mode(args.mode),
        },
        MessageKind::ListenStop => ControlMessage::ListenStop { session_id },
        MessageKind::WakeWord => ControlMessage::WakeWordDetected {
            session_id,
            wake_word: required(&args.text, "--text")?.to_string(),
        },
        MessageKind::Abort => ControlMessage::Abort {
            session_id,
            reason: if args.wake_word_abort {
                AbortReason::WakeWordDetected
            } else {
                AbortReason::None
            },
        },
        MessageKind::IotDescriptors => {
            let payload = required(&args.payload, "--payload")?;
            return iot_descriptor_messages(&session_id, payload)
                .map_err(|err| control_error("--payload", err));
        }
        MessageKind::IotStates => ControlMessage::IotStates {
            session_id,
            states: payload_json(&args.payload)?,
        },
        MessageKind::Mcp => ControlMessage::Mcp {
            session_id,
            payload: payload_json(&args.payload)?,
        },
        MessageKind::Goodbye => ControlMessage::Goodbye {
            session_id: Some(session_id),
        },
    };
    Ok(vec![message])
}

fn listening_mode(mode: ModeArg) -> ListeningMode {
    match mode {
        ModeArg::Auto => ListeningMode::AutoStop,
        ModeArg::Manual => ListeningMode::ManualStop,
        ModeArg::Realtime => ListeningMode::Realtime,
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> CliResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| CliError::new(USAGE, format!("{flag} is required for this message")))
}

fn payload_json(payload: &Option<String>) -> CliResult<Value> {
    parse_json_text(required(payload, "--payload")?).map_err(|err| control_error("--payload", err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use voxlink_frame::FrameVersion;

    use super::*;
    use crate::exit::DATA_INVALID;

    fn args(kind: MessageKind) -> MessageArgs {
        MessageArgs {
            kind,
            session_id: "s1".to_string(),
            mode: ModeArg::Auto,
            text: None,
            wake_word_abort: false,
            payload: None,
            frame_version: FrameVersion::V1,
            aec: false,
        }
    }

    #[test]
    fn listen_start_uses_mode() {
        let mut a = args(MessageKind::ListenStart);
        a.mode = ModeArg::Manual;
        let messages = build(&a).unwrap();
        assert_eq!(
            messages[0].to_value(),
            json!({"session_id": "s1", "type": "listen", "state": "start", "mode": "manual"})
        );
    }

    #[test]
    fn wake_word_needs_text() {
        let err = build(&args(MessageKind::WakeWord)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn descriptors_split() {
        let mut a = args(MessageKind::IotDescriptors);
        a.payload = Some(r#"[{"name":"a"},{"name":"b"},{"name":"c"}]"#.to_string());
        assert_eq!(build(&a).unwrap().len(), 3);

        a.payload = Some("{}".to_string());
        assert_eq!(build(&a).unwrap_err().code, DATA_INVALID);
    }

    #[test]
    fn hello_advertises_aec() {
        let mut a = args(MessageKind::Hello);
        a.aec = true;
        a.frame_version = FrameVersion::V2;
        let value = build(&a).unwrap()[0].to_value();
        assert_eq!(value["version"], 2);
        assert_eq!(value["features"], json!({"mcp": true, "aec": true}));
    }
}
