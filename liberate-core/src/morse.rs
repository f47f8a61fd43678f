//! Morse timing decoder
//!
//! Marks (dots and dashes) are buffered as they arrive. Resolution is driven
//! by a separate periodic check that measures the silence since the last
//! mark: past the letter gap the buffered code is looked up and emitted,
//! past the word gap a space follows it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::symbol::Symbol;

/// Milliseconds from a monotonic clock
pub type Timestamp = u64;

/// A single Morse element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Dot,
    Dash,
}

impl Mark {
    /// Code unit appended to the pending code string
    pub fn code_unit(self) -> char {
        match self {
            Mark::Dot => '.',
            Mark::Dash => '-',
        }
    }
}

/// Alphabet supported by the decoder, in reference-chart order
const MORSE_ALPHABET: [(char, &str); 40] = [
    ('A', ".-"), ('B', "-..."), ('C', "-.-."), ('D', "-.."), ('E', "."),
    ('F', "..-."), ('G', "--."), ('H', "...."), ('I', ".."), ('J', ".---"),
    ('K', "-.-"), ('L', ".-.."), ('M', "--"), ('N', "-."), ('O', "---"),
    ('P', ".--."), ('Q', "--.-"), ('R', ".-."), ('S', "..."), ('T', "-"),
    ('U', "..-"), ('V', "...-"), ('W', ".--"), ('X', "-..-"), ('Y', "-.--"),
    ('Z', "--.."), ('1', ".----"), ('2', "..---"), ('3', "...--"), ('4', "....-"),
    ('5', "....."), ('6', "-...."), ('7', "--..."), ('8', "---.."), ('9', "----."),
    ('0', "-----"), (' ', "/"), ('.', ".-.-.-"), (',', "--..--"), ('?', "..--.."),
];

/// Bidirectional symbol <-> code mapping
#[derive(Debug, Clone)]
pub struct MorseTable {
    entries: Vec<(Symbol, &'static str)>,
    by_code: HashMap<&'static str, Symbol>,
}

impl MorseTable {
    /// International Morse for A-Z, 0-9, space (`/`), period, comma and `?`
    pub fn standard() -> Self {
        let entries: Vec<(Symbol, &'static str)> = MORSE_ALPHABET
            .iter()
            .map(|&(c, code)| (Symbol::from(c), code))
            .collect();
        let by_code = entries.iter().map(|&(symbol, code)| (code, symbol)).collect();
        Self { entries, by_code }
    }

    /// Look up a code. Unknown codes yield `None`.
    pub fn decode(&self, code: &str) -> Option<Symbol> {
        self.by_code.get(code).copied()
    }

    /// Code for a symbol (letters are matched case-insensitively)
    pub fn encode(&self, symbol: Symbol) -> Option<&'static str> {
        let symbol = match symbol {
            Symbol::Char(c) => Symbol::Char(c.to_ascii_uppercase()),
            other => other,
        };
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, code)| *code)
    }

    /// All entries in chart order
    pub fn entries(&self) -> &[(Symbol, &'static str)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MorseTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// One of the four timing thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingParam {
    Dot,
    Dash,
    LetterGap,
    WordGap,
}

impl TimingParam {
    pub const ALL: [TimingParam; 4] = [
        TimingParam::Dot,
        TimingParam::Dash,
        TimingParam::LetterGap,
        TimingParam::WordGap,
    ];

    /// Lower bound for this threshold in ms
    pub fn minimum_ms(self) -> u32 {
        match self {
            TimingParam::Dot => 50,
            TimingParam::Dash => 150,
            TimingParam::LetterGap => 300,
            TimingParam::WordGap => 500,
        }
    }

    /// Increment used by +/- controls
    pub fn step_ms(self) -> u32 {
        match self {
            TimingParam::Dot | TimingParam::Dash => 50,
            TimingParam::LetterGap => 100,
            TimingParam::WordGap => 200,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimingParam::Dot => "dot",
            TimingParam::Dash => "dash",
            TimingParam::LetterGap => "letter",
            TimingParam::WordGap => "word",
        }
    }
}

impl fmt::Display for TimingParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unknown timing parameter name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown timing parameter: {0:?} (expected dot, dash, letter or word)")]
pub struct UnknownTimingParam(pub String);

impl FromStr for TimingParam {
    type Err = UnknownTimingParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" => Ok(TimingParam::Dot),
            "dash" => Ok(TimingParam::Dash),
            "letter" | "letter_gap" => Ok(TimingParam::LetterGap),
            "word" | "word_gap" => Ok(TimingParam::WordGap),
            _ => Err(UnknownTimingParam(s.to_string())),
        }
    }
}

/// Morse timing thresholds, each clamped to its minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorseTimingConfig {
    dot_ms: u32,
    dash_ms: u32,
    letter_gap_ms: u32,
    word_gap_ms: u32,
}

impl MorseTimingConfig {
    pub fn new(dot_ms: u32, dash_ms: u32, letter_gap_ms: u32, word_gap_ms: u32) -> Self {
        let mut config = Self::default();
        config.set(TimingParam::Dot, dot_ms);
        config.set(TimingParam::Dash, dash_ms);
        config.set(TimingParam::LetterGap, letter_gap_ms);
        config.set(TimingParam::WordGap, word_gap_ms);
        config
    }

    pub fn dot_ms(&self) -> u32 {
        self.dot_ms
    }

    pub fn dash_ms(&self) -> u32 {
        self.dash_ms
    }

    pub fn letter_gap_ms(&self) -> u32 {
        self.letter_gap_ms
    }

    pub fn word_gap_ms(&self) -> u32 {
        self.word_gap_ms
    }

    pub fn get(&self, param: TimingParam) -> u32 {
        match param {
            TimingParam::Dot => self.dot_ms,
            TimingParam::Dash => self.dash_ms,
            TimingParam::LetterGap => self.letter_gap_ms,
            TimingParam::WordGap => self.word_gap_ms,
        }
    }

    /// Store a value, raised to the parameter minimum. Returns the stored value.
    pub fn set(&mut self, param: TimingParam, ms: u32) -> u32 {
        let value = ms.max(param.minimum_ms());
        if value != ms {
            tracing::debug!(%param, requested = ms, clamped = value, "morse timing clamped");
        }
        match param {
            TimingParam::Dot => self.dot_ms = value,
            TimingParam::Dash => self.dash_ms = value,
            TimingParam::LetterGap => self.letter_gap_ms = value,
            TimingParam::WordGap => self.word_gap_ms = value,
        }
        value
    }

    /// Shift a value by `delta` ms (negative shortens), clamped to the minimum
    pub fn adjust(&mut self, param: TimingParam, delta: i64) -> u32 {
        let target = (i64::from(self.get(param)) + delta).clamp(0, i64::from(u32::MAX));
        // In range after the clamp above
        self.set(param, target as u32)
    }

    /// Classify a key-press duration: shorter than the dot/dash midpoint is a dot
    pub fn classify_press(&self, duration_ms: u32) -> Mark {
        let midpoint = (u64::from(self.dot_ms) + u64::from(self.dash_ms)) / 2;
        if u64::from(duration_ms) < midpoint {
            Mark::Dot
        } else {
            Mark::Dash
        }
    }
}

impl Default for MorseTimingConfig {
    fn default() -> Self {
        Self {
            dot_ms: 200,
            dash_ms: 600,
            letter_gap_ms: 1000,
            word_gap_ms: 2000,
        }
    }
}

/// Output of a silence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseEvent {
    /// A complete letter was recognized
    Character(char),
    /// The silence exceeded the word gap
    WordBoundary,
}

/// Tick-driven Morse decoder
#[derive(Debug, Clone)]
pub struct MorseDecoder {
    table: MorseTable,
    timing: MorseTimingConfig,
    pending: String,
    last_signal: Timestamp,
}

impl MorseDecoder {
    pub fn new(timing: MorseTimingConfig) -> Self {
        Self {
            table: MorseTable::standard(),
            timing,
            pending: String::with_capacity(8),
            last_signal: 0,
        }
    }

    pub fn table(&self) -> &MorseTable {
        &self.table
    }

    pub fn timing(&self) -> MorseTimingConfig {
        self.timing
    }

    /// Code units received since the last resolution
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn last_signal_time(&self) -> Timestamp {
        self.last_signal
    }

    /// Buffer a mark received at `at`. Never resolves by itself.
    pub fn add_mark(&mut self, mark: Mark, at: Timestamp) {
        self.pending.push(mark.code_unit());
        self.last_signal = at;
    }

    /// Measure silence at `now` and resolve the pending code if a gap elapsed.
    ///
    /// Both thresholds are strict: silence equal to a gap does not resolve.
    /// A word boundary is reported in the same pass, after the letter.
    pub fn on_tick(&mut self, now: Timestamp) -> Vec<MorseEvent> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        // A clock that runs backwards reads as no silence at all
        let silence = now.saturating_sub(self.last_signal);
        if silence <= u64::from(self.timing.letter_gap_ms) {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        match self.table.decode(&self.pending).and_then(|s| s.as_char()) {
            Some(c) => {
                tracing::debug!(code = %self.pending, character = ?c, "morse decoded");
                events.push(MorseEvent::Character(c));
            }
            None => {
                tracing::debug!(code = %self.pending, "unrecognized morse code discarded");
            }
        }
        self.pending.clear();

        if silence > u64::from(self.timing.word_gap_ms) {
            events.push(MorseEvent::WordBoundary);
        }
        events
    }

    /// Discard the pending code
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Shift one threshold; buffered marks are unaffected
    pub fn adjust_timing(&mut self, param: TimingParam, delta: i64) -> u32 {
        self.timing.adjust(param, delta)
    }

    pub fn set_timing(&mut self, param: TimingParam, ms: u32) -> u32 {
        self.timing.set(param, ms)
    }
}

impl Default for MorseDecoder {
    fn default() -> Self {
        Self::new(MorseTimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut MorseDecoder, code: &str, start: Timestamp) -> Timestamp {
        let mut t = start;
        for unit in code.chars() {
            let mark = if unit == '.' { Mark::Dot } else { Mark::Dash };
            decoder.add_mark(mark, t);
            t += 50;
        }
        t - 50
    }

    #[test]
    fn test_table_is_total_on_alphabet() {
        let table = MorseTable::standard();
        assert_eq!(table.len(), 40);
        for (symbol, code) in table.entries() {
            assert_eq!(table.decode(code), Some(*symbol));
            assert_eq!(table.encode(*symbol), Some(*code));
        }
        assert_eq!(table.decode("/"), Some(Symbol::Space));
        assert_eq!(table.encode(Symbol::Char('s')), Some("..."));
        assert_eq!(table.decode("----------"), None);
        assert_eq!(table.encode(Symbol::Speak), None);
    }

    #[test]
    fn test_add_mark_does_not_resolve() {
        let mut decoder = MorseDecoder::default();
        decoder.add_mark(Mark::Dot, 100);
        decoder.add_mark(Mark::Dash, 300);
        assert_eq!(decoder.pending(), ".-");
        assert_eq!(decoder.last_signal_time(), 300);
    }

    #[test]
    fn test_letter_then_word_in_same_pass() {
        let mut decoder = MorseDecoder::default();
        let last = feed(&mut decoder, ".-", 1_000);

        assert!(decoder.on_tick(last + 500).is_empty());
        assert_eq!(decoder.on_tick(last + 1_001), vec![MorseEvent::Character('A')]);
        assert_eq!(decoder.pending(), "");

        let last = feed(&mut decoder, ".-", 10_000);
        assert_eq!(
            decoder.on_tick(last + 2_001),
            vec![MorseEvent::Character('A'), MorseEvent::WordBoundary]
        );
    }

    #[test]
    fn test_gap_boundaries_are_strict() {
        let mut decoder = MorseDecoder::default();
        let last = feed(&mut decoder, "...", 0);
        assert!(decoder.on_tick(last + 1_000).is_empty());
        assert_eq!(decoder.pending(), "...");

        assert_eq!(decoder.on_tick(last + 2_000), vec![MorseEvent::Character('S')]);
    }

    #[test]
    fn test_unrecognized_code_is_discarded() {
        let mut decoder = MorseDecoder::default();
        let last = feed(&mut decoder, "----------", 0);
        assert!(decoder.on_tick(last + 1_500).is_empty());
        assert_eq!(decoder.pending(), "");
    }

    #[test]
    fn test_unrecognized_code_still_reports_word_boundary() {
        let mut decoder = MorseDecoder::default();
        let last = feed(&mut decoder, "........", 0);
        assert_eq!(decoder.on_tick(last + 2_500), vec![MorseEvent::WordBoundary]);
    }

    #[test]
    fn test_empty_buffer_tick_is_noop() {
        let mut decoder = MorseDecoder::default();
        assert!(decoder.on_tick(1_000_000).is_empty());
    }

    #[test]
    fn test_backwards_clock_does_not_resolve() {
        let mut decoder = MorseDecoder::default();
        decoder.add_mark(Mark::Dot, 5_000);
        assert!(decoder.on_tick(1_000).is_empty());
        assert_eq!(decoder.pending(), ".");
    }

    #[test]
    fn test_slash_decodes_to_space_character() {
        let mut decoder = MorseDecoder::default();
        decoder.pending.push('/');
        assert_eq!(decoder.on_tick(5_000), vec![MorseEvent::Character(' '), MorseEvent::WordBoundary]);
    }

    #[test]
    fn test_clear_discards_pending() {
        let mut decoder = MorseDecoder::default();
        decoder.add_mark(Mark::Dash, 0);
        decoder.clear();
        assert_eq!(decoder.pending(), "");
        assert!(decoder.on_tick(10_000).is_empty());
    }

    #[test]
    fn test_adjust_timing_clamps_to_minimum() {
        let mut decoder = MorseDecoder::default();
        assert_eq!(decoder.adjust_timing(TimingParam::Dot, -1000), 50);
        assert_eq!(decoder.timing().dot_ms(), 50);
        assert_eq!(decoder.adjust_timing(TimingParam::Dash, -10_000), 150);
        assert_eq!(decoder.adjust_timing(TimingParam::LetterGap, -800), 300);
        assert_eq!(decoder.adjust_timing(TimingParam::WordGap, 200), 2200);
        assert_eq!(decoder.adjust_timing(TimingParam::WordGap, -5000), 500);
    }

    #[test]
    fn test_adjust_timing_keeps_pending_marks() {
        let mut decoder = MorseDecoder::default();
        decoder.add_mark(Mark::Dot, 0);
        decoder.adjust_timing(TimingParam::LetterGap, 500);
        assert_eq!(decoder.pending(), ".");
        // New gap applies to the next check
        assert!(decoder.on_tick(1_200).is_empty());
        assert_eq!(decoder.on_tick(1_501), vec![MorseEvent::Character('E')]);
    }

    #[test]
    fn test_timing_config_new_clamps_each_field() {
        let config = MorseTimingConfig::new(0, 0, 0, 0);
        for param in TimingParam::ALL {
            assert_eq!(config.get(param), param.minimum_ms());
        }
    }

    #[test]
    fn test_classify_press() {
        let config = MorseTimingConfig::default();
        assert_eq!(config.classify_press(150), Mark::Dot);
        assert_eq!(config.classify_press(399), Mark::Dot);
        assert_eq!(config.classify_press(400), Mark::Dash);
        assert_eq!(config.classify_press(900), Mark::Dash);
    }

    #[test]
    fn test_timing_param_parse() {
        assert_eq!("dot".parse::<TimingParam>(), Ok(TimingParam::Dot));
        assert_eq!("Letter".parse::<TimingParam>(), Ok(TimingParam::LetterGap));
        assert_eq!("word_gap".parse::<TimingParam>(), Ok(TimingParam::WordGap));
        assert!("pause".parse::<TimingParam>().is_err());
    }
}
