//! Auto-type demo on virtual time

use anyhow::bail;
use liberate_core::{InboundEvent, ScanConfig};
use liberate_engine::{EngineCommand, EngineEvent, SteppedEngine};
use liberate_input::{AutoTyper, Command};

/// Upper bound on ticks spent reaching a single symbol
const TICKS_PER_SYMBOL: usize = 200;

/// Power on and type `text` through the scanner. Returns the typed message.
pub fn run(engine: &mut SteppedEngine, text: &str) -> anyhow::Result<String> {
    let mut typer = AutoTyper::new(text, engine.state().selector().layout());
    let budget = TICKS_PER_SYMBOL * (typer.remaining() + 1);

    let mut events = engine.handle(EngineCommand::Input(InboundEvent::PowerOn));
    events.push(EngineEvent::Output(engine.state().selector().cursor().into()));

    let mut spent = 0;
    loop {
        let mut confirm = false;
        for event in &events {
            if let EngineEvent::Output(output) = event {
                confirm |= typer.on_event(output) == Some(Command::Confirm);
            }
        }
        // Stop before the scanner moves past the last commit
        if typer.is_finished() {
            break;
        }

        if spent >= budget {
            bail!("auto-type stalled with {} symbols left", typer.remaining());
        }
        spent += 1;

        events = if confirm {
            engine.handle(EngineCommand::Input(InboundEvent::Confirm))
        } else {
            // Wait for the next scan tick
            let wait = u64::from(ScanConfig::MAX_INTERVAL_MS) * 2;
            engine.advance_until(wait, |batch| {
                batch.iter().any(|e| matches!(e, EngineEvent::Output(_)))
            })
        };
    }

    Ok(engine.state().message().to_string())
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
    fn test_types_text() {
        let message = run(&mut engine(LayoutPreset::Classic), "help me").unwrap();
        assert_eq!(message, "HELP ME");
    }

    #[test]
    fn test_skips_unknown_characters() {
        let message = run(&mut engine(LayoutPreset::Skip), "ok?").unwrap();
        assert_eq!(message, "OK");
    }

    #[test]
    fn test_no_tick_after_last_commit() {
        let mut engine = engine(LayoutPreset::Classic);
        run(&mut engine, "a").unwrap();
        let cursor = engine.state().selector().cursor();
        assert_eq!((cursor.row, cursor.col), (0, 0));
        assert_eq!(engine.state().message(), "A");
    }

    #[test]
    fn test_empty_plan_leaves_cursor_alone() {
        let mut engine = engine(LayoutPreset::Classic);
        assert_eq!(run(&mut engine, "~").unwrap(), "");
        assert_eq!(engine.now(), 0);
    }

    #[test]
    fn test_assistive_layout_speaks_at_end() {
        let mut engine = engine(LayoutPreset::Assistive);
        let message = run(&mut engine, "hi").unwrap();
        assert_eq!(message, "HI");
        assert_eq!(engine.state().selector().cursor().row, 0);
    }
}
