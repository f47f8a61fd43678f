//! Translation from input commands to engine commands

use liberate_core::{InboundEvent, Timestamp};
use liberate_engine::{EngineCommand, EngineEvent};
use liberate_input::{Command, DeviceCommand};
use liberate_settings::Settings;

/// Engine command for an input command. Morse marks are stamped with `now`.
///
/// Returns `None` for commands the front end handles itself (mode changes,
/// quitting, device requests).
pub fn to_engine(cmd: &Command, now: Timestamp) -> Option<EngineCommand> {
    let engine_cmd = match *cmd {
        Command::Confirm => EngineCommand::Input(InboundEvent::Confirm),
        Command::TogglePower => EngineCommand::TogglePower,
        Command::PowerOn => EngineCommand::Input(InboundEvent::PowerOn),
        Command::PowerOff => EngineCommand::Input(InboundEvent::PowerOff),

        Command::Faster => EngineCommand::Faster,
        Command::Slower => EngineCommand::Slower,
        Command::SetSpeed(ms) => EngineCommand::SetTickInterval(ms),
        Command::ResetCursor => EngineCommand::ResetCursor,

        Command::Dot => EngineCommand::Input(InboundEvent::MarkDot(now)),
        Command::Dash => EngineCommand::Input(InboundEvent::MarkDash(now)),
        Command::ClearMorse => EngineCommand::ClearMorse,
        Command::AddSpace => EngineCommand::AddSpace,
        Command::MorseBackspace => EngineCommand::MorseBackspace,
        Command::Speak => EngineCommand::Speak,

        Command::AdjustTiming(param, delta) => EngineCommand::AdjustTiming(param, delta),
        Command::SetTiming(param, ms) => EngineCommand::SetTiming(param, ms),
        Command::SetLayout(preset) => EngineCommand::SetLayout(preset.layout()),

        Command::ResetBaseline
        | Command::EnterScanMode
        | Command::EnterMorseMode
        | Command::EnterCommandMode
        | Command::Cancel
        | Command::ExecuteCommand(_)
        | Command::Quit => return None,
    };
    Some(engine_cmd)
}

/// Keep persisted settings in step with engine changes
pub fn track_settings(settings: &mut Settings, cmd: &Command) {
    if let Command::SetLayout(preset) = *cmd {
        settings.layout = preset;
    }
}

/// Keep persisted settings in step with engine-reported values
pub fn track_event(settings: &mut Settings, event: &EngineEvent) {
    match *event {
        EngineEvent::TickIntervalChanged(ms) => {
            settings.scan.set_tick_interval(ms);
        }
        EngineEvent::TimingChanged(timing) => settings.timing = timing,
        _ => {}
    }
}

/// No transport is attached in this build; the request is only logged
pub fn request_baseline_reset(serial_port: Option<&str>) {
    let bytes = DeviceCommand::ResetBaseline.encode();
    tracing::info!(
        line = %String::from_utf8_lossy(bytes).trim_end(),
        port = serial_port.unwrap_or("none"),
        "baseline reset requested, no transport attached"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use liberate_core::{LayoutPreset, MorseTimingConfig, TimingParam};

    #[test]
    fn test_marks_are_stamped() {
        assert!(matches!(
            to_engine(&Command::Dot, 420),
            Some(EngineCommand::Input(InboundEvent::MarkDot(420)))
        ));
        assert!(matches!(
            to_engine(&Command::Dash, 7),
            Some(EngineCommand::Input(InboundEvent::MarkDash(7)))
        ));
    }

    #[test]
    fn test_front_end_commands_not_forwarded() {
        assert!(to_engine(&Command::Quit, 0).is_none());
        assert!(to_engine(&Command::EnterMorseMode, 0).is_none());
        assert!(to_engine(&Command::ResetBaseline, 0).is_none());
        assert!(to_engine(&Command::ExecuteCommand("x".into()), 0).is_none());
    }

    #[test]
    fn test_layout_command_carries_preset_layout() {
        match to_engine(&Command::SetLayout(LayoutPreset::Classic), 0) {
            Some(EngineCommand::SetLayout(layout)) => assert_eq!(layout.row_count(), 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_settings_follow_changes() {
        let mut settings = Settings::default();
        track_settings(&mut settings, &Command::SetLayout(LayoutPreset::Skip));
        track_event(&mut settings, &EngineEvent::TickIntervalChanged(700));
        let timing = MorseTimingConfig::new(100, 300, 900, 1500);
        track_event(&mut settings, &EngineEvent::TimingChanged(timing));

        assert_eq!(settings.layout, LayoutPreset::Skip);
        assert_eq!(settings.scan.tick_interval_ms(), 700);
        assert_eq!(settings.timing.get(TimingParam::WordGap), 1500);
    }
}
