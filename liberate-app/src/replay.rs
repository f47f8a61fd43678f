//! Replay of recorded device sessions
//!
//! A script has one step per line, `<delay_ms> <device line>`, where the
//! delay is measured from the previous step. `#` starts a comment line.
//!
//! ```text
//! # power on, pick the first row, then key "E" in Morse
//! 0 ON
//! 1200 1
//! 300 .
//! ```

use std::fs;
use std::io;
use std::path::Path;

use liberate_core::Timestamp;
use liberate_engine::{SteppedEngine, MORSE_CHECK_INTERVAL_MS};
use liberate_input::{DeviceMessage, LineDecoder};
use thiserror::Error;

use crate::dispatch;

/// Errors reading a replay script
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: expected `<delay_ms> <device line>`, got {text:?}")]
    Malformed { line: usize, text: String },
}

/// One scripted device line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub delay_ms: u64,
    pub line: String,
}

pub fn load_script(path: &Path) -> Result<Vec<ReplayStep>, ReplayError> {
    parse_script(&fs::read_to_string(path)?)
}

pub fn parse_script(content: &str) -> Result<Vec<ReplayStep>, ReplayError> {
    let mut steps = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let malformed = || ReplayError::Malformed {
            line: index + 1,
            text: text.to_string(),
        };
        let (delay, line) = text.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let delay_ms = delay.parse().map_err(|_| malformed())?;
        steps.push(ReplayStep {
            delay_ms,
            line: line.trim().to_string(),
        });
    }

    Ok(steps)
}

/// Feed the steps through the device protocol into the engine and return
/// the typed message. Morse still pending after the last step is resolved.
pub fn run(engine: &mut SteppedEngine, steps: &[ReplayStep]) -> String {
    let mut decoder = LineDecoder::new();

    for step in steps {
        engine.advance(step.delay_ms);

        let mut bytes = step.line.clone().into_bytes();
        bytes.push(b'\n');
        for result in decoder.push(&bytes) {
            match result {
                Ok(message) => deliver(engine, &message),
                Err(e) => tracing::warn!(error = %e, "device line dropped"),
            }
        }
    }

    if !engine.state().decoder().pending().is_empty() {
        let letter_gap: Timestamp = engine.state().decoder().timing().letter_gap_ms().into();
        engine.advance(letter_gap + MORSE_CHECK_INTERVAL_MS);
    }

    engine.state().message().to_string()
}

fn deliver(engine: &mut SteppedEngine, message: &DeviceMessage) {
    match message {
        DeviceMessage::Error(text) => tracing::warn!(%text, "device error"),
        DeviceMessage::Info(text) => tracing::info!(%text, "device info"),
        _ => {}
    }

    if let Some(cmd) = message.to_command() {
        if let Some(engine_cmd) = dispatch::to_engine(&cmd, engine.now()) {
            engine.handle(engine_cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_state;
    use liberate_core::LayoutPreset;
    use liberate_settings::Settings;

    fn engine(preset: LayoutPreset) -> SteppedEngine {
        let settings = Settings {
            layout: preset,
            ..Settings::default()
        };
        SteppedEngine::new(build_state(&settings), 0)
    }

    #[test]
    fn test_parse_script() {
        let steps = parse_script("# header\n\n0 ON\n  250   ERR: low battery \n").unwrap();
        assert_eq!(
            steps,
            vec![
                ReplayStep { delay_ms: 0, line: "ON".into() },
                ReplayStep { delay_ms: 250, line: "ERR: low battery".into() },
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_line_number() {
        let err = parse_script("0 ON\nsoon 1\n").unwrap_err();
        assert!(matches!(err, ReplayError::Malformed { line: 2, .. }));
        assert!(parse_script("100\n").is_err());
    }

    #[test]
    fn test_replay_scan_selection() {
        // Classic layout, 1000 ms ticks: row 1 at t=1000, lock, columns to L
        let script = "0 ON\n1100 1\n1000 1\n";
        let steps = parse_script(script).unwrap();
        assert_eq!(run(&mut engine(LayoutPreset::Classic), &steps), "L");
    }

    #[test]
    fn test_replay_morse_sos() {
        let mut script = String::new();
        for code in ["...", "---", "..."] {
            for mark in code.chars() {
                script.push_str(&format!("150 {mark}\n"));
            }
            script.push_str("1100 INFO: gap\n");
        }
        let steps = parse_script(&script).unwrap();
        assert_eq!(run(&mut engine(LayoutPreset::Assistive), &steps), "SOS");
    }

    #[test]
    fn test_replay_resolves_trailing_morse() {
        let steps = parse_script("0 -\n").unwrap();
        assert_eq!(run(&mut engine(LayoutPreset::Assistive), &steps), "T");
    }

    #[test]
    fn test_unknown_and_oversized_lines_ignored() {
        let long = "x".repeat(300);
        let steps = parse_script(&format!("0 hello\n0 {long}\n0 .\n")).unwrap();
        assert_eq!(run(&mut engine(LayoutPreset::Assistive), &steps), "E");
    }
}
