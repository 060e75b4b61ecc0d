use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded frame, as printed by `decode`.
#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub frame_version: u8,
    pub frame_type: &'static str,
    pub payload_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_duration: Option<u32>,
    /// Message `type` for JSON frames that parse as a control message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    pub payload: String,
}

pub fn print_frame(out: &FrameOutput, raw: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["VERSION", "TYPE", "SIZE", "TIMESTAMP", "PAYLOAD"]);
            table.add_row(vec![
                format!("v{}", out.frame_version),
                out.frame_type.to_string(),
                out.payload_size.to_string(),
                out.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
                out.payload.clone(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "v{} {} size={} timestamp={} payload={}",
                out.frame_version,
                out.frame_type,
                out.payload_size,
                out.timestamp.unwrap_or(0),
                out.payload
            );
        }
        OutputFormat::Raw => print_raw(raw),
    }
}

/// One encoded frame, as printed by `encode`.
#[derive(Debug, Serialize)]
pub struct EncodedOutput {
    pub frame_version: u8,
    pub frame_type: &'static str,
    pub size: usize,
    pub hex: String,
}

pub fn print_encoded(out: &EncodedOutput, raw: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["VERSION", "TYPE", "SIZE", "HEX"]);
            table.add_row(vec![
                format!("v{}", out.frame_version),
                out.frame_type.to_string(),
                out.size.to_string(),
                out.hex.clone(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.hex),
        OutputFormat::Raw => print_raw(raw),
    }
}

/// Control messages are JSON already; every format prints one per line
/// except `table` and `pretty`.
pub fn print_messages(messages: &[serde_json::Value], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            for message in messages {
                println!("{message}");
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["TYPE", "MESSAGE"]);
            for message in messages {
                table.add_row(vec![
                    message["type"].as_str().unwrap_or_default().to_string(),
                    message.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for message in messages {
                println!(
                    "{}",
                    serde_json::to_string_pretty(message).unwrap_or_else(|_| message.to_string())
                );
            }
        }
    }
}

/// One observer invocation recorded during `replay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventOutput {
    ChannelOpened {
        session_id: String,
        sample_rate: u32,
        frame_duration: u32,
    },
    Audio {
        timestamp: u32,
        sample_rate: u32,
        frame_duration: u32,
        payload_size: usize,
    },
    Json {
        message_type: String,
        message: serde_json::Value,
    },
    NetworkError {
        message: String,
    },
    ChannelClosed,
}

impl EventOutput {
    fn name(&self) -> &'static str {
        match self {
            Self::ChannelOpened { .. } => "channel_opened",
            Self::Audio { .. } => "audio",
            Self::Json { .. } => "json",
            Self::NetworkError { .. } => "network_error",
            Self::ChannelClosed => "channel_closed",
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::ChannelOpened {
                session_id,
                sample_rate,
                frame_duration,
            } => format!("session={session_id} rate={sample_rate} duration={frame_duration}ms"),
            Self::Audio {
                timestamp,
                payload_size,
                ..
            } => format!("timestamp={timestamp} size={payload_size}"),
            Self::Json { message, .. } => message.to_string(),
            Self::NetworkError { message } => message.clone(),
            Self::ChannelClosed => String::new(),
        }
    }
}

pub fn print_events(events: &[EventOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            for event in events {
                print_json(event);
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "EVENT", "DETAIL"]);
            for (index, event) in events.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    event.name().to_string(),
                    event.detail(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for event in events {
                println!("{} {}", event.name(), event.detail());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.contains(|c: char| c.is_control() && !c.is_whitespace()) => {
            text.to_string()
        }
        _ => format!("<binary {} bytes>", payload.len()),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
