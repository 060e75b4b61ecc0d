use std::sync::{Arc, Mutex};
use std::time::Duration;

use voxlink::control::{AbortReason, ListeningMode};
use voxlink::frame::{encode_audio, AudioStreamPacket, FrameConfig, FrameVersion};
use voxlink::session::{
    ChannelState, ManualClock, ProtocolEngine, SessionConfig, SessionError,
};
use voxlink::transport::LoopbackTransport;

const SERVER_HELLO: &str = r#"{"type":"hello","transport":"websocket","session_id":"abc123","audio_params":{"sample_rate":16000,"frame_duration":40}}"#;

fn v2_config() -> SessionConfig {
    SessionConfig {
        frame: FrameConfig {
            version: FrameVersion::V2,
            ..FrameConfig::default()
        },
        ..SessionConfig::default()
    }
}

#[test]
fn audio_frame_then_close() {
    let (transport, handle) = LoopbackTransport::new();
    let mut engine = ProtocolEngine::new(transport, v2_config());

    let received = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&received);
    engine.on_incoming_audio(move |packet| sink.lock().unwrap().push(packet));
    let counter = Arc::clone(&closed);
    engine.on_channel_closed(move || *counter.lock().unwrap() += 1);

    engine.open_channel().unwrap();
    engine.handle_text(SERVER_HELLO);
    assert_eq!(engine.server_sample_rate(), 16000);
    assert_eq!(engine.server_frame_duration(), 40);
    assert_eq!(engine.session_id(), "abc123");

    let wire: &[u8] = &[
        0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xE8, 0x00, 0x00, 0x00,
        0x02, 0x01, 0x02,
    ];
    engine.handle_binary(wire);

    {
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].timestamp, 1000);
        assert_eq!(received[0].payload.as_ref(), &[0x01, 0x02]);
    }

    engine.close_channel();
    assert_eq!(*closed.lock().unwrap(), 1);
    assert_eq!(engine.session_id(), "");
    assert_eq!(engine.channel_state(), ChannelState::Closed);
    assert!(!handle.is_open());
}

#[test]
fn abort_on_closed_channel_sends_nothing() {
    let (transport, handle) = LoopbackTransport::new();
    let mut engine = ProtocolEngine::new(transport, SessionConfig::default());

    let err = engine
        .send_abort_speaking(AbortReason::WakeWordDetected)
        .unwrap_err();

    assert!(matches!(err, SessionError::NotOpen(ChannelState::Closed)));
    assert!(handle.sent().is_empty());
}

#[test]
fn liveness_probe_from_another_thread() {
    let (transport, _handle) = LoopbackTransport::new();
    let clock = ManualClock::new();
    let mut engine =
        ProtocolEngine::with_clock(transport, v2_config(), Arc::new(clock.clone()));
    engine.open_channel().unwrap();
    engine.handle_text(SERVER_HELLO);

    let probe = engine.liveness();
    let packet = AudioStreamPacket::new(0, 0, 5, vec![0xAB]);
    engine.handle_binary(&encode_audio(&packet, FrameVersion::V2).unwrap());
    assert!(!probe.is_timeout());

    clock.advance(Duration::from_secs(121));
    let timed_out = std::thread::spawn(move || probe.is_timeout()).join().unwrap();
    assert!(timed_out);

    assert!(engine.tick().is_err());
    assert_eq!(engine.channel_state(), ChannelState::Closed);
    assert!(engine.send_start_listening(ListeningMode::AutoStop).is_err());
}
