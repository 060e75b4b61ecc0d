#![cfg(feature = "cli")]

use std::process::Command;

use voxlink::frame::{AudioStreamPacket, FrameConfig, FrameVersion, FrameWriter};

fn voxlink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_voxlink"));
    cmd.arg("--log-level").arg("error").arg("--format").arg("json");
    cmd
}

#[test]
fn decode_v2_audio_frame() {
    let output = voxlink()
        .args(["decode", "--hex", "0002 0000 00000000 000003e8 00000002 0102"])
        .output()
        .expect("decode should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["frame_type"], "audio");
    assert_eq!(value["timestamp"], 1000);
    assert_eq!(value["payload_size"], 2);
}

#[test]
fn decode_size_mismatch_exits_60() {
    let output = voxlink()
        .args(["decode", "--hex", "00000005aabb", "--frame-version", "3"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("decode failed"));
}

#[test]
fn encode_v3_audio_frame() {
    let output = voxlink()
        .args(["encode", "--hex", "aabbcc", "-f", "3", "--timestamp", "99"])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["hex"], "00000003aabbcc");
}

#[test]
fn encode_json_on_v1_is_usage_error() {
    let output = voxlink()
        .args(["encode", "--json", r#"{"type":"goodbye"}"#, "-f", "1"])
        .output()
        .expect("encode should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn message_renders_abort() {
    let output = voxlink()
        .args(["message", "abort", "--session-id", "s1", "--wake-word-abort"])
        .output()
        .expect("message should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(
        value,
        serde_json::json!({"session_id": "s1", "type": "abort", "reason": "wake_word_detected"})
    );
}

#[test]
fn replay_capture_prints_events() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("capture.bin");
    let config = FrameConfig {
        version: FrameVersion::V2,
        ..FrameConfig::default()
    };
    let file = std::fs::File::create(&path).expect("capture should be creatable");
    let mut writer = FrameWriter::new(file, config).expect("v2 is stream-framed");
    writer
        .write_audio(&AudioStreamPacket::new(0, 0, 1000, vec![1, 2]))
        .unwrap();
    writer.write_json(r#"{"type":"tts","state":"stop"}"#).unwrap();
    drop(writer);

    let output = voxlink()
        .arg("replay")
        .arg(&path)
        .args(["-f", "2"])
        .output()
        .expect("replay should run");

    assert!(output.status.success());
    let events: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();
    let kinds: Vec<&str> = events
        .iter()
        .map(|event| event["event"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(kinds, ["channel_opened", "audio", "json", "channel_closed"]);
    assert_eq!(events[1]["timestamp"], 1000);
}

#[test]
fn replay_missing_file_is_usage_error() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let output = voxlink()
        .arg("replay")
        .arg(dir.path().join("absent.bin"))
        .args(["-f", "3"])
        .output()
        .expect("replay should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_name() {
    let output = voxlink()
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("voxlink "));
}
