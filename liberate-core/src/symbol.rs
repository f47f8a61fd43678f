//! Keyboard symbols and the fixed scanning grid

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single key on the scanning keyboard.
///
/// Printable characters and named control actions are distinct variants so
/// consumers have to handle every action explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Printable character (typed as-is)
    Char(char),
    Space,
    Backspace,
    Enter,
    /// Commit that does nothing, used to back out of a row
    Skip,
    /// Read the current message aloud
    Speak,
    /// Raise an emergency alert
    Sos,
}

impl Symbol {
    /// Label shown on the key
    pub fn label(&self) -> String {
        match self {
            Symbol::Char(c) => c.to_string(),
            Symbol::Space => "␣".to_string(),
            Symbol::Backspace => "⌫".to_string(),
            Symbol::Enter => "⏎".to_string(),
            Symbol::Skip => "Skip".to_string(),
            Symbol::Speak => "Speak".to_string(),
            Symbol::Sos => "SOS".to_string(),
        }
    }

    /// Character this symbol types, if any
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Char(c) => Some(*c),
            Symbol::Space => Some(' '),
            Symbol::Enter => Some('\n'),
            Symbol::Backspace | Symbol::Skip | Symbol::Speak | Symbol::Sos => None,
        }
    }

    /// Whether this is a control action rather than a printable character
    pub fn is_control(&self) -> bool {
        !matches!(self, Symbol::Char(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        match c {
            ' ' => Symbol::Space,
            '\n' => Symbol::Enter,
            c => Symbol::Char(c),
        }
    }
}

/// Error returned when a key label is not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown key label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for Symbol {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "␣" => return Ok(Symbol::Space),
            "⌫" => return Ok(Symbol::Backspace),
            "⏎" => return Ok(Symbol::Enter),
            _ => {}
        }

        match s.to_ascii_lowercase().as_str() {
            "space" => return Ok(Symbol::Space),
            "backspace" => return Ok(Symbol::Backspace),
            "enter" => return Ok(Symbol::Enter),
            "skip" => return Ok(Symbol::Skip),
            "speak" => return Ok(Symbol::Speak),
            "sos" => return Ok(Symbol::Sos),
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Symbol::Char(c)),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Errors rejecting an unusable layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout has no rows")]
    Empty,
    #[error("Layout row {0} has no symbols")]
    EmptyRow(usize),
}

/// Immutable grid of symbols, scanned row by row.
///
/// Rows may have different lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    rows: Vec<Vec<Symbol>>,
}

impl KeyboardLayout {
    /// Build a layout, rejecting empty grids and empty rows
    pub fn new(rows: Vec<Vec<Symbol>>) -> Result<Self, LayoutError> {
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }
        if let Some(index) = rows.iter().position(|row| row.is_empty()) {
            return Err(LayoutError::EmptyRow(index));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<Symbol>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of a row (0 for an out-of-range row)
    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// First position of a symbol, scanning rows top to bottom
    pub fn position_of(&self, symbol: Symbol) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(row_idx, row)| {
            row.iter()
                .position(|s| *s == symbol)
                .map(|col_idx| (row_idx, col_idx))
        })
    }

    /// Four rows of ten: letters, digits, space, backspace, enter and period
    pub fn classic() -> Self {
        Self {
            rows: Self::character_rows(),
        }
    }

    /// Classic rows with a trailing `Skip` on each row
    pub fn with_skip() -> Self {
        let rows = Self::character_rows()
            .into_iter()
            .map(|mut row| {
                row.push(Symbol::Skip);
                row
            })
            .collect();
        Self { rows }
    }

    /// `Speak`, `SOS`, `Skip` action row above the skip rows
    pub fn assistive() -> Self {
        let mut rows = vec![vec![Symbol::Speak, Symbol::Sos, Symbol::Skip]];
        rows.extend(Self::with_skip().rows);
        Self { rows }
    }

    fn character_rows() -> Vec<Vec<Symbol>> {
        let mut rows: Vec<Vec<Symbol>> = ["ABCDEFGHIJ", "KLMNOPQRST", "UVWXYZ1234"]
            .iter()
            .map(|line| line.chars().map(Symbol::Char).collect())
            .collect();

        let mut last: Vec<Symbol> = "567890".chars().map(Symbol::Char).collect();
        last.extend([Symbol::Space, Symbol::Backspace, Symbol::Enter, Symbol::Char('.')]);
        rows.push(last);
        rows
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::assistive()
    }
}

/// Named built-in layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPreset {
    Classic,
    Skip,
    #[default]
    Assistive,
}

impl LayoutPreset {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutPreset::Classic => "classic",
            LayoutPreset::Skip => "skip",
            LayoutPreset::Assistive => "assistive",
        }
    }

    pub fn layout(&self) -> KeyboardLayout {
        match self {
            LayoutPreset::Classic => KeyboardLayout::classic(),
            LayoutPreset::Skip => KeyboardLayout::with_skip(),
            LayoutPreset::Assistive => KeyboardLayout::assistive(),
        }
    }
}

/// Error returned for an unknown preset name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown layout preset: {0:?} (expected classic, skip or assistive)")]
pub struct LayoutPresetError(pub String);

impl FromStr for LayoutPreset {
    type Err = LayoutPresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(LayoutPreset::Classic),
            "skip" => Ok(LayoutPreset::Skip),
            "assistive" => Ok(LayoutPreset::Assistive),
            _ => Err(LayoutPresetError(s.to_string())),
        }
    }
}
