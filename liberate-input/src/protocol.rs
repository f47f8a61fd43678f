//! Device line protocol
//!
//! The muscle sensor reports over a serial or Bluetooth link as
//! newline-terminated ASCII lines:
//!
//! | line        | meaning                         |
//! |-------------|---------------------------------|
//! | `1`         | twitch detected (confirm)       |
//! | `.…`        | Morse dot                       |
//! | `-…`        | Morse dash                      |
//! | `ON`/`OFF`  | device power switch             |
//! | `ERR:<msg>` | device error                    |
//! | `INFO:<msg>`| device information              |
//!
//! The only command sent back is `RESET`, which re-measures the sensor
//! baseline. Transport I/O happens elsewhere; this module only converts
//! bytes to messages and messages to commands.

use thiserror::Error;

use crate::commands::Command;

/// Longest accepted line, excluding the terminator
pub const MAX_LINE_LEN: usize = 256;

/// Errors while reassembling device lines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Device line exceeds {MAX_LINE_LEN} bytes ({0} bytes dropped)")]
    LineTooLong(usize),
    #[error("Device line is not valid UTF-8")]
    InvalidUtf8,
}

/// A decoded device line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    Twitch,
    Dot,
    Dash,
    PowerOn,
    PowerOff,
    Error(String),
    Info(String),
    Unknown(String),
}

impl DeviceMessage {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let message = if line == "1" {
            DeviceMessage::Twitch
        } else if line.starts_with('.') {
            DeviceMessage::Dot
        } else if line.starts_with('-') {
            DeviceMessage::Dash
        } else if line == "ON" {
            DeviceMessage::PowerOn
        } else if line == "OFF" {
            DeviceMessage::PowerOff
        } else if let Some(text) = line.strip_prefix("ERR:") {
            DeviceMessage::Error(text.trim().to_string())
        } else if let Some(text) = line.strip_prefix("INFO:") {
            DeviceMessage::Info(text.trim().to_string())
        } else {
            DeviceMessage::Unknown(line.to_string())
        };
        Some(message)
    }

    /// Command for the engine, if this message drives input
    pub fn to_command(&self) -> Option<Command> {
        match self {
            DeviceMessage::Twitch => Some(Command::Confirm),
            DeviceMessage::Dot => Some(Command::Dot),
            DeviceMessage::Dash => Some(Command::Dash),
            DeviceMessage::PowerOn => Some(Command::PowerOn),
            DeviceMessage::PowerOff => Some(Command::PowerOff),
            DeviceMessage::Error(_) | DeviceMessage::Info(_) | DeviceMessage::Unknown(_) => None,
        }
    }
}

/// Commands sent to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    ResetBaseline,
}

impl DeviceCommand {
    /// Wire encoding, newline terminated
    pub fn encode(self) -> &'static [u8] {
        match self {
            DeviceCommand::ResetBaseline => b"RESET\n",
        }
    }
}

/// Reassembles device lines from arbitrary byte chunks
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    /// Bytes discarded from the current oversized line
    overflow: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            overflow: 0,
        }
    }

    /// Feed received bytes and return every complete line's message
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<DeviceMessage, ProtocolError>> {
        let mut out = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.overflow > 0 {
                    out.push(Err(ProtocolError::LineTooLong(self.overflow + self.buffer.len())));
                } else {
                    match std::str::from_utf8(&self.buffer) {
                        Ok(line) => {
                            if let Some(message) = DeviceMessage::parse(line) {
                                if let DeviceMessage::Unknown(ref text) = message {
                                    tracing::debug!(line = %text, "unknown device line");
                                }
                                out.push(Ok(message));
                            }
                        }
                        Err(_) => out.push(Err(ProtocolError::InvalidUtf8)),
                    }
                }
                self.buffer.clear();
                self.overflow = 0;
            } else if self.buffer.len() >= MAX_LINE_LEN {
                self.overflow += 1;
            } else {
                self.buffer.push(byte);
            }
        }

        out
    }
}
