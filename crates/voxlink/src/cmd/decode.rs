use tracing::debug;
use voxlink_control::ControlMessage;
use voxlink_frame::{decode_frame, Frame, FrameVersion};

use crate::cmd::{parse_hex, read_file, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{payload_preview, print_frame, FrameOutput, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = match (&args.hex, &args.file) {
        (Some(hex), _) => parse_hex(hex)?,
        (None, Some(path)) => read_file(path)?,
        (None, None) => Vec::new(),
    };
    debug!(size = bytes.len(), version = %args.frame_version, "decoding frame");

    let frame = decode_frame(&bytes, args.frame_version)
        .map_err(|err| frame_error("decode failed", err))?;
    let out = describe(frame, args.frame_version, args.sample_rate, args.frame_duration);

    let raw = raw_payload(&bytes, args.frame_version);
    print_frame(&out, raw, format);
    Ok(SUCCESS)
}

fn describe(frame: Frame, version: FrameVersion, sample_rate: u32, frame_duration: u32) -> FrameOutput {
    let frame_type = frame.frame_type().name();
    let payload_size = frame.payload_len();
    match frame {
        Frame::Audio(audio) => {
            let packet = audio.into_packet(sample_rate, frame_duration);
            FrameOutput {
                frame_version: version.as_u8(),
                frame_type,
                payload_size,
                timestamp: Some(packet.timestamp),
                sample_rate: Some(packet.sample_rate),
                frame_duration: Some(packet.frame_duration),
                message_type: None,
                payload: payload_preview(&packet.payload),
            }
        }
        Frame::Json(text) => FrameOutput {
            frame_version: version.as_u8(),
            frame_type,
            payload_size,
            timestamp: None,
            sample_rate: None,
            frame_duration: None,
            message_type: ControlMessage::parse(&text)
                .ok()
                .map(|message| message.kind().to_string()),
            payload: text,
        },
    }
}

fn raw_payload(bytes: &[u8], version: FrameVersion) -> &[u8] {
    bytes.get(version.header_size()..).unwrap_or_default()
}
