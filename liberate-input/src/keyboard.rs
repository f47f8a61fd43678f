//! Terminal key bindings for simulating the switch and Morse key

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use liberate_core::{LayoutPreset, TimingParam};

use crate::commands::{Command, Mode};

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
    /// Mode to return to when the command line closes
    previous_mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Scan,
            previous_mode: Mode::Scan,
            command_buffer: String::new(),
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }

        match self.mode {
            Mode::Scan => self.handle_scan_mode(key),
            Mode::Morse => self.handle_morse_mode(key),
            Mode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_shared(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Tab => {
                if self.mode == Mode::Scan {
                    self.mode = Mode::Morse;
                    Some(Command::EnterMorseMode)
                } else {
                    self.mode = Mode::Scan;
                    Some(Command::EnterScanMode)
                }
            }
            KeyCode::Char(':') => {
                self.previous_mode = self.mode;
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        }
    }

    fn handle_scan_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Confirm),
            KeyCode::Char('p') => Some(Command::TogglePower),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::Faster),
            KeyCode::Char('-') => Some(Command::Slower),
            KeyCode::Char('r') => Some(Command::ResetCursor),
            KeyCode::Char('b') => Some(Command::ResetBaseline),
            _ => self.handle_shared(key),
        }
    }

    fn handle_morse_mode(&mut self, key: KeyEvent) -> Option<Command> {
        let step = |param: TimingParam, up: bool| {
            let delta = i64::from(param.step_ms());
            Some(Command::AdjustTiming(param, if up { delta } else { -delta }))
        };

        match key.code {
            KeyCode::Char('.') | KeyCode::Char('j') => Some(Command::Dot),
            KeyCode::Char('-') | KeyCode::Char('k') => Some(Command::Dash),
            KeyCode::Char('c') => Some(Command::ClearMorse),
            KeyCode::Char(' ') => Some(Command::AddSpace),
            KeyCode::Backspace => Some(Command::MorseBackspace),
            KeyCode::Char('s') => Some(Command::Speak),

            // Timing: lowercase shortens, uppercase lengthens
            KeyCode::Char('d') => step(TimingParam::Dot, false),
            KeyCode::Char('D') => step(TimingParam::Dot, true),
            KeyCode::Char('a') => step(TimingParam::Dash, false),
            KeyCode::Char('A') => step(TimingParam::Dash, true),
            KeyCode::Char('l') => step(TimingParam::LetterGap, false),
            KeyCode::Char('L') => step(TimingParam::LetterGap, true),
            KeyCode::Char('w') => step(TimingParam::WordGap, false),
            KeyCode::Char('W') => step(TimingParam::WordGap, true),

            _ => self.handle_shared(key),
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = self.parse_command();
                self.mode = self.previous_mode;
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = self.previous_mode;
                self.command_buffer.clear();
                Some(Command::Cancel)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = self.previous_mode;
                    Some(Command::Cancel)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn parse_command(&self) -> Option<Command> {
        parse_command_line(&self.command_buffer)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `:` command line
pub fn parse_command_line(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let args: Vec<&str> = words.collect();

    match (head, args.as_slice()) {
        ("q" | "quit", []) => Some(Command::Quit),
        ("power", ["on"]) => Some(Command::PowerOn),
        ("power", ["off"]) => Some(Command::PowerOff),
        ("power", []) => Some(Command::TogglePower),
        ("speed", [ms]) => ms.parse().ok().map(Command::SetSpeed),
        ("set", [param, ms]) => {
            let param = param.parse::<TimingParam>().ok()?;
            ms.parse().ok().map(|ms| Command::SetTiming(param, ms))
        }
        ("layout", [name]) => name.parse::<LayoutPreset>().ok().map(Command::SetLayout),
        ("reset", []) => Some(Command::ResetCursor),
        ("baseline", []) => Some(Command::ResetBaseline),
        ("speak", []) => Some(Command::Speak),
        _ => None,
    }
}
