//! Command definitions for Liberate

use liberate_core::{LayoutPreset, TimingParam};

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Switch scanning keyboard
    #[default]
    Scan,
    /// Dot/dash keying
    Morse,
    /// `:` command line
    Command,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Scan => "SCAN",
            Mode::Morse => "MORSE",
            Mode::Command => "COMMAND",
        }
    }
}

/// Commands that can be dispatched from an input source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Switch
    Confirm,
    TogglePower,
    PowerOn,
    PowerOff,

    // Scan speed
    Faster,
    Slower,
    SetSpeed(u32),
    ResetCursor,

    // Morse keying (timestamped by the receiver)
    Dot,
    Dash,
    ClearMorse,
    AddSpace,
    MorseBackspace,
    Speak,

    // Morse timing
    AdjustTiming(TimingParam, i64),
    SetTiming(TimingParam, u32),

    SetLayout(LayoutPreset),

    /// Ask the sensor to re-measure its resting baseline
    ResetBaseline,

    // Mode changes
    EnterScanMode,
    EnterMorseMode,
    EnterCommandMode,
    Cancel,

    /// Command line that did not parse
    ExecuteCommand(String),

    Quit,
}
