//! Input sources for Liberate
//!
//! Everything that can stand in for the physical switch:
//! - Keyboard: modal terminal key bindings and the `:` command line
//! - Protocol: newline-delimited lines from the muscle sensor
//! - Auto-type: a driver that confirms on its own to type a demo text

mod autotype;
mod commands;
mod keyboard;
mod protocol;

pub use autotype::AutoTyper;
pub use commands::{Command, Mode};
pub use keyboard::{parse_command_line, InputHandler};
pub use protocol::{DeviceCommand, DeviceMessage, LineDecoder, ProtocolError, MAX_LINE_LEN};
