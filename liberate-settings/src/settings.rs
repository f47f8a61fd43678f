//! Simple settings persistence for Liberate
//!
//! Stores scan speed, Morse timing, layout and the sensor port between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use liberate_core::{LayoutPreset, MorseTimingConfig, ScanConfig, TimingParam};
use thiserror::Error;

/// Errors loading or saving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// User settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub scan: ScanConfig,
    pub timing: MorseTimingConfig,
    pub layout: LayoutPreset,
    /// Serial or Bluetooth device the sensor is attached to
    pub serial_port: Option<String>,
}

/// File key for each Morse threshold
fn timing_key(param: TimingParam) -> &'static str {
    match param {
        TimingParam::Dot => "dot_ms",
        TimingParam::Dash => "dash_ms",
        TimingParam::LetterGap => "letter_gap_ms",
        TimingParam::WordGap => "word_gap_ms",
    }
}

impl Settings {
    /// Load settings from the default location
    ///
    /// Returns defaults if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let path = Self::settings_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::settings_path())
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Get the default settings file path
    pub fn settings_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liberate")
            .join("settings.txt")
    }

    /// Parse settings from simple key=value format.
    ///
    /// Malformed values keep the default and are logged; numbers are clamped
    /// through the same setters used at runtime.
    fn parse(content: &str) -> Self {
        let mut settings = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if let Err(e) = settings.apply(key.trim(), value.trim()) {
                tracing::warn!(error = %e, "ignoring setting");
            }
        }

        settings
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        if key == "tick_interval_ms" {
            let ms = value.parse().map_err(|_| invalid())?;
            self.scan.set_tick_interval(ms);
            return Ok(());
        }
        if let Some(param) = TimingParam::ALL.into_iter().find(|p| timing_key(*p) == key) {
            let ms = value.parse().map_err(|_| invalid())?;
            self.timing.set(param, ms);
            return Ok(());
        }

        match key {
            "layout" => self.layout = value.parse().map_err(|_| invalid())?,
            "serial_port" => {
                self.serial_port = (!value.is_empty()).then(|| value.to_string());
            }
            _ => {} // Ignore unknown keys
        }
        Ok(())
    }

    /// Serialize settings to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = vec![
            "# Liberate settings".to_string(),
            format!("tick_interval_ms={}", self.scan.tick_interval_ms()),
        ];
        for param in TimingParam::ALL {
            lines.push(format!("{}={}", timing_key(param), self.timing.get(param)));
        }
        lines.push(format!("layout={}", self.layout.name()));
        if let Some(ref port) = self.serial_port {
            lines.push(format!("serial_port={}", port));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(Settings::parse(""), Settings::default());
    }

    #[test]
    fn test_parse_full_file() {
        let content = "# Liberate settings\n\
                       tick_interval_ms=750\n\
                       dot_ms=150\n\
                       dash_ms=450\n\
                       letter_gap_ms=800\n\
                       word_gap_ms=1800\n\
                       layout=classic\n\
                       serial_port=/dev/rfcomm0\n";
        let settings = Settings::parse(content);

        assert_eq!(settings.scan.tick_interval_ms(), 750);
        assert_eq!(settings.timing, MorseTimingConfig::new(150, 450, 800, 1800));
        assert_eq!(settings.layout, LayoutPreset::Classic);
        assert_eq!(settings.serial_port.as_deref(), Some("/dev/rfcomm0"));
    }

    #[test]
    fn test_values_clamped_on_load() {
        let settings = Settings::parse("tick_interval_ms=20\ndot_ms=10\nword_gap_ms=0");
        assert_eq!(settings.scan.tick_interval_ms(), 100);
        assert_eq!(settings.timing.dot_ms(), 50);
        assert_eq!(settings.timing.word_gap_ms(), 500);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let settings = Settings::parse("tick_interval_ms=fast\nlayout=qwerty\ndash_ms=-5\nnonsense");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let settings = Settings::parse("theme=dark\nlayout = skip");
        assert_eq!(settings.layout, LayoutPreset::Skip);
    }

    #[test]
    fn test_apply_reports_invalid_value() {
        let mut settings = Settings::default();
        let err = settings.apply("dot_ms", "soon").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref key, .. } if key == "dot_ms"));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let settings = Settings {
            scan: ScanConfig::new(1300),
            timing: MorseTimingConfig::new(250, 700, 1200, 2600),
            layout: LayoutPreset::Skip,
            serial_port: Some("COM3".into()),
        };
        assert_eq!(Settings::parse(&settings.serialize()), settings);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("liberate-settings-{}", std::process::id()))
            .join("settings.txt");
        let mut settings = Settings::default();
        settings.scan.set_tick_interval(400);

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Settings::load_from(Path::new("/nonexistent/liberate/settings.txt")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
