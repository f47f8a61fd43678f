//! Log output for the liberate binary
//!
//! `LIBERATE_LOG` wins when it parses, then `RUST_LOG`, then the level
//! chosen with `-v` or `-q` (`warn` when neither is given).
//!
//! The interactive front end puts the terminal in raw mode, so it logs to
//! `liberate.log` in the user data directory instead of stderr.

use std::fs::{self, File};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

/// Logging choices made on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub level: Level,
    pub sink: LogSink,
}

impl LogOptions {
    /// `-v` beats `-q`; interactive runs log to a file
    pub fn from_args(verbose: bool, quiet: bool, interactive: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        };
        let sink = if interactive {
            LogSink::File(log_file_path())
        } else {
            LogSink::Stderr
        };
        Self { level, sink }
    }
}

/// `<data dir>/liberate/liberate.log`, or the working directory without one
pub fn log_file_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("liberate"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liberate.log")
}

/// Install the global subscriber. A file that cannot be opened falls back
/// to stderr.
pub fn install(options: &LogOptions) {
    let filter = env_filter(options.level);

    if let LogSink::File(path) = &options.sink {
        match open_log_file(path) {
            Ok(file) => {
                let _ = fmt()
                    .with_env_filter(filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::uptime())
                    .try_init();
                return;
            }
            Err(err) => eprintln!("liberate: cannot open log file {}: {err}", path.display()),
        }
    }

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

fn env_filter(level: Level) -> EnvFilter {
    if let Ok(spec) = std::env::var("LIBERATE_LOG") {
        if let Ok(filter) = EnvFilter::try_new(&spec) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_args() {
        assert_eq!(LogOptions::from_args(false, false, false).level, Level::WARN);
        assert_eq!(LogOptions::from_args(true, false, false).level, Level::DEBUG);
        assert_eq!(LogOptions::from_args(false, true, false).level, Level::ERROR);
        assert_eq!(LogOptions::from_args(true, true, false).level, Level::DEBUG);
    }

    #[test]
    fn test_interactive_logs_to_file() {
        assert_eq!(LogOptions::from_args(false, false, false).sink, LogSink::Stderr);
        assert_eq!(
            LogOptions::from_args(false, false, true).sink,
            LogSink::File(log_file_path())
        );
    }

    #[test]
    fn test_log_file_named_after_app() {
        let path = log_file_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("liberate.log"));
        assert_eq!(
            path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()),
            Some("liberate")
        );
    }
}
