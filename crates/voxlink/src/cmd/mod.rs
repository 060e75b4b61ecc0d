use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use voxlink_frame::FrameVersion;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod message;
pub mod replay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one binary frame and print its contents.
    Decode(DecodeArgs),
    /// Build one binary frame from a payload.
    Encode(EncodeArgs),
    /// Render a control message as sent on the wire.
    Message(MessageArgs),
    /// Drive a frame capture through a loopback session and print events.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Decode(_) => "decode",
            Command::Encode(_) => "encode",
            Command::Message(_) => "message",
            Command::Replay(_) => "replay",
            Command::Version(_) => "version",
        }
    }
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    let span = tracing::info_span!("voxlink", command = command.name());
    let _entered = span.enter();
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Message(args) => message::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (whitespace ignored).
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the frame from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Frame layout (1, 2 or 3).
    #[arg(long = "frame-version", short = 'f', default_value = "2", value_parser = parse_frame_version)]
    pub frame_version: FrameVersion,
    /// Sample rate attached to decoded audio.
    #[arg(long, default_value_t = voxlink_session::DEFAULT_SERVER_SAMPLE_RATE)]
    pub sample_rate: u32,
    /// Frame duration (ms) attached to decoded audio.
    #[arg(long, default_value_t = voxlink_session::DEFAULT_SERVER_FRAME_DURATION)]
    pub frame_duration: u32,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Audio payload as hex.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub hex: Option<String>,
    /// JSON control message to embed in a JSON frame.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub json: Option<String>,
    /// Read the audio payload from a file.
    #[arg(long, conflicts_with_all = ["hex", "json"])]
    pub file: Option<PathBuf>,
    /// Frame layout (1, 2 or 3).
    #[arg(long = "frame-version", short = 'f', default_value = "2", value_parser = parse_frame_version)]
    pub frame_version: FrameVersion,
    /// Header timestamp in milliseconds (v2 only).
    #[arg(long, default_value_t = 0)]
    pub timestamp: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    Hello,
    ListenStart,
    ListenStop,
    WakeWord,
    Abort,
    IotDescriptors,
    IotStates,
    Mcp,
    Goodbye,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Manual,
    Realtime,
}

#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Message kind.
    #[arg(value_enum)]
    pub kind: MessageKind,
    /// Session identifier stamped on the message.
    #[arg(long, default_value = "")]
    pub session_id: String,
    /// Listening mode (listen-start).
    #[arg(long, value_enum, default_value = "auto")]
    pub mode: ModeArg,
    /// Wake word (wake-word).
    #[arg(long)]
    pub text: Option<String>,
    /// Abort because the wake word fired.
    #[arg(long)]
    pub wake_word_abort: bool,
    /// JSON payload (iot-descriptors, iot-states, mcp).
    #[arg(long)]
    pub payload: Option<String>,
    /// Frame layout advertised by hello (1, 2 or 3).
    #[arg(long = "frame-version", short = 'f', default_value = "1", value_parser = parse_frame_version)]
    pub frame_version: FrameVersion,
    /// Advertise echo cancellation in hello.
    #[arg(long)]
    pub aec: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file of back-to-back v2 or v3 frames.
    pub path: PathBuf,
    /// Session configuration JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Frame layout of the capture; overrides the config file.
    #[arg(long = "frame-version", short = 'f', value_parser = parse_frame_version)]
    pub frame_version: Option<FrameVersion>,
    /// Server hello JSON used to open the session.
    #[arg(long, value_name = "JSON")]
    pub hello: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_frame_version(input: &str) -> Result<FrameVersion, String> {
    let digits = input.trim().trim_start_matches(|c| c == 'v' || c == 'V');
    digits
        .parse::<u8>()
        .ok()
        .and_then(FrameVersion::from_u8)
        .ok_or_else(|| format!("unsupported frame version '{input}' (expected 1, 2 or 3)"))
}

pub fn read_file(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}

pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.split_whitespace().collect();
    hex::decode(&digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
