use voxlink_control::ControlMessage;
use voxlink_frame::{encode_audio, encode_json, AudioStreamPacket, FrameType};

use crate::cmd::{parse_hex, read_file, EncodeArgs};
use crate::exit::{control_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, EncodedOutput, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (frame_type, bytes) = if let Some(json) = &args.json {
        ControlMessage::parse(json).map_err(|err| control_error("--json", err))?;
        let bytes = encode_json(json, args.frame_version)
            .map_err(|err| frame_error("encode failed", err))?;
        (FrameType::Json, bytes)
    } else {
        let payload = match (&args.hex, &args.file) {
            (Some(hex), _) => parse_hex(hex)?,
            (None, Some(path)) => read_file(path)?,
            (None, None) => {
                return Err(CliError::new(
                    USAGE,
                    "one of --hex, --file or --json is required",
                ))
            }
        };
        // Rates are session state, never carried on the wire.
        let packet = AudioStreamPacket::new(0, 0, args.timestamp, payload);
        let bytes = encode_audio(&packet, args.frame_version)
            .map_err(|err| frame_error("encode failed", err))?;
        (FrameType::Audio, bytes)
    };

    let out = EncodedOutput {
        frame_version: args.frame_version.as_u8(),
        frame_type: frame_type.name(),
        size: bytes.len(),
        hex: hex::encode(&bytes),
    };
    print_encoded(&out, &bytes, format);
    Ok(SUCCESS)
}
