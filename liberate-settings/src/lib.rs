//! Settings persistence for Liberate

mod settings;

pub use settings::{Settings, SettingsError};
