mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "voxlink", version, about = "Voice session protocol toolkit")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use voxlink_frame::FrameVersion;

    use super::*;
    use crate::cmd::MessageKind;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "voxlink",
            "decode",
            "--hex",
            "00000002aabb",
            "--frame-version",
            "3",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => assert_eq!(args.frame_version, FrameVersion::V3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "voxlink",
            "encode",
            "--hex",
            "0102",
            "--json",
            "{\"type\":\"goodbye\"}",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_frame_version() {
        let err = Cli::try_parse_from(["voxlink", "encode", "--hex", "01", "-f", "9"])
            .expect_err("bad version should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_message_kind() {
        let cli = Cli::try_parse_from([
            "voxlink",
            "message",
            "listen-start",
            "--session-id",
            "abc",
            "--mode",
            "realtime",
        ])
        .expect("message args should parse");

        match cli.command {
            Command::Message(args) => assert_eq!(args.kind, MessageKind::ListenStart),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
