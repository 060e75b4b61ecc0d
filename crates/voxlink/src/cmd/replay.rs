use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};
use voxlink_control::{ControlMessage, Hello};
use voxlink_frame::FrameReader;
use voxlink_session::{ChannelState, ProtocolEngine, SessionConfig};
use voxlink_transport::LoopbackTransport;

use crate::cmd::{read_file, ReplayArgs};
use crate::exit::{
    frame_error, io_error, session_error, CliError, CliResult, DATA_INVALID, SUCCESS,
    TRANSPORT_ERROR,
};
use crate::output::{print_events, EventOutput, OutputFormat};

type EventLog = Arc<Mutex<Vec<EventOutput>>>;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(version) = args.frame_version {
        config.frame.version = version;
    }
    let hello = args
        .hello
        .clone()
        .unwrap_or_else(|| default_hello(&config.transport_name));

    let file = File::open(&args.path)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    let reader = FrameReader::new(BufReader::new(file), config.frame.clone())
        .map_err(|err| frame_error("replay", err))?;

    let events = EventLog::default();
    let result = replay(reader, config, &hello, &events);

    let events = events.lock().unwrap_or_else(PoisonError::into_inner);
    print_events(&events, format);
    result.map(|frames| {
        info!(frames, events = events.len(), "replay finished");
        SUCCESS
    })
}

fn replay<R: std::io::Read>(
    reader: FrameReader<R>,
    config: SessionConfig,
    hello: &str,
    events: &EventLog,
) -> CliResult<usize> {
    let (transport, _handle) = LoopbackTransport::new();
    let mut engine = ProtocolEngine::new(transport, config);
    register_observers(&mut engine, events);

    engine
        .start()
        .map_err(|err| session_error("start failed", err))?;
    engine
        .open_channel()
        .map_err(|err| session_error("open failed", err))?;
    engine.handle_text(hello);
    if engine.channel_state() != ChannelState::Open {
        return Err(CliError::new(TRANSPORT_ERROR, "server hello was rejected"));
    }
    push(
        events,
        EventOutput::ChannelOpened {
            session_id: engine.session_id().to_string(),
            sample_rate: engine.server_sample_rate(),
            frame_duration: engine.server_frame_duration(),
        },
    );

    let mut frames = 0;
    for frame in reader {
        let frame = frame.map_err(|err| frame_error("replay", err))?;
        frames += 1;
        engine.handle_frame(frame);
        if engine.channel_state() == ChannelState::Closed {
            warn!(frames, "session closed before end of capture");
            return Ok(frames);
        }
    }

    engine.close_channel();
    Ok(frames)
}

fn register_observers(engine: &mut ProtocolEngine, events: &EventLog) {
    let log = Arc::clone(events);
    engine.on_incoming_audio(move |packet| {
        push(
            &log,
            EventOutput::Audio {
                timestamp: packet.timestamp,
                sample_rate: packet.sample_rate,
                frame_duration: packet.frame_duration,
                payload_size: packet.payload.len(),
            },
        );
    });

    let log = Arc::clone(events);
    engine.on_incoming_json(move |message| {
        push(
            &log,
            EventOutput::Json {
                message_type: message.kind().to_string(),
                message: message.to_value(),
            },
        );
    });

    let log = Arc::clone(events);
    engine.on_network_error(move |message| {
        push(
            &log,
            EventOutput::NetworkError {
                message: message.to_string(),
            },
        );
    });

    let log = Arc::clone(events);
    engine.on_channel_closed(move || push(&log, EventOutput::ChannelClosed));
}

fn push(events: &EventLog, event: EventOutput) {
    events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(event);
}

fn load_config(path: Option<&Path>) -> CliResult<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("invalid session config {}: {err}", path.display()),
        )
    })
}

fn default_hello(transport: &str) -> String {
    ControlMessage::Hello(Hello::server(transport, "replay", None)).to_json()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use voxlink_frame::{AudioStreamPacket, FrameConfig, FrameVersion, FrameWriter};

    use super::*;

    fn v3_config() -> SessionConfig {
        SessionConfig {
            frame: FrameConfig {
                version: FrameVersion::V3,
                ..FrameConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    fn capture(config: &SessionConfig, build: impl FnOnce(&mut FrameWriter<Vec<u8>>)) -> Vec<u8> {
        let mut writer = FrameWriter::new(Vec::new(), config.frame.clone()).unwrap();
        build(&mut writer);
        writer.into_inner()
    }

    #[test]
    fn replays_audio_and_messages() {
        let config = v3_config();
        let bytes = capture(&config, |w| {
            w.write_audio(&AudioStreamPacket::new(0, 0, 0, vec![1, 2, 3]))
                .unwrap();
            w.write_json(r#"{"type":"stt","text":"hello"}"#).unwrap();
        });
        let reader = FrameReader::new(Cursor::new(bytes), config.frame.clone()).unwrap();
        let events = EventLog::default();

        let frames = replay(reader, config, &default_hello("websocket"), &events).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(frames, 2);
        assert_eq!(events.len(), 4);
        assert!(matches!(
            &events[0],
            EventOutput::ChannelOpened { session_id, sample_rate: 24000, .. } if session_id == "replay"
        ));
        assert!(matches!(
            events[1],
            EventOutput::Audio {
                payload_size: 3,
                ..
            }
        ));
        assert!(matches!(&events[2], EventOutput::Json { message_type, .. } if message_type == "stt"));
        assert_eq!(events[3], EventOutput::ChannelClosed);
    }

    #[test]
    fn server_goodbye_ends_replay() {
        let config = v3_config();
        let bytes = capture(&config, |w| {
            w.write_json(r#"{"type":"goodbye"}"#).unwrap();
            w.write_audio(&AudioStreamPacket::new(0, 0, 0, vec![9]))
                .unwrap();
        });
        let reader = FrameReader::new(Cursor::new(bytes), config.frame.clone()).unwrap();
        let events = EventLog::default();

        let frames = replay(reader, config, &default_hello("websocket"), &events).unwrap();

        assert_eq!(frames, 1);
        assert_eq!(events.lock().unwrap().last(), Some(&EventOutput::ChannelClosed));
    }

    #[test]
    fn rejected_hello_is_transport_error() {
        let config = v3_config();
        let reader = FrameReader::new(Cursor::new(Vec::new()), config.frame.clone()).unwrap();
        let events = EventLog::default();

        let err = replay(reader, config, &default_hello("udp"), &events).unwrap_err();

        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(matches!(
            events.lock().unwrap()[0],
            EventOutput::NetworkError { .. }
        ));
    }
}
