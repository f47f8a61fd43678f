//! Liberate - switch-scanning and Morse assistive keyboard
//!
//! One muscle twitch selects keys from a scanning grid; short and long
//! presses spell letters in Morse code.

mod demo;
mod dispatch;
mod interactive;
mod logging;
mod replay;

use std::path::PathBuf;

use anyhow::{bail, Context};
use liberate_core::{LayoutPreset, MorseDecoder, ScanningSelector};
use liberate_engine::{EngineState, LogAnnouncer, LogInjector, MessageBuffer, SteppedEngine};
use liberate_settings::Settings;

use logging::LogOptions;

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum RunMode {
    #[default]
    Interactive,
    Replay(PathBuf),
    AutoType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Options {
    mode: RunMode,
    layout: Option<LayoutPreset>,
    verbose: bool,
    quiet: bool,
    help: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> anyhow::Result<Options> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => {
                let path = args.next().context("--replay requires a script path")?;
                options.mode = RunMode::Replay(PathBuf::from(path));
            }
            "--autotype" => {
                let text = args.next().context("--autotype requires the text to type")?;
                options.mode = RunMode::AutoType(text);
            }
            "--layout" => {
                let name = args.next().context("--layout requires a preset name")?;
                options.layout = Some(name.parse()?);
            }
            "-v" | "--verbose" => options.verbose = true,
            "-q" | "--quiet" => options.quiet = true,
            "-h" | "--help" => options.help = true,
            other => bail!("unknown argument: {other}"),
        }
    }

    Ok(options)
}

fn print_help() {
    println!("liberate");
    println!();
    println!("Usage:");
    println!("  liberate [--layout <preset>] [-v | -q]");
    println!("  liberate --replay <script>");
    println!("  liberate --autotype <text>");
    println!();
    println!("Flags:");
    println!("  --replay <script>  Feed recorded device lines (`<delay_ms> <line>`)");
    println!("  --autotype <text>  Type a text through the scanner and print it");
    println!("  --layout <preset>  classic, skip or assistive");
    println!("  -v, --verbose      Debug logging");
    println!("  -q, --quiet        Errors only");
    println!("  -h, --help         Show this help message");
    println!();
    println!("Environment:");
    println!("  LIBERATE_LOG=<directives>  Log filter, overrides RUST_LOG");
}

/// Engine state from persisted settings, relaying output to the log
pub(crate) fn build_state(settings: &Settings) -> EngineState {
    let selector = ScanningSelector::new(settings.layout.layout(), settings.scan);
    let decoder = MorseDecoder::new(settings.timing);
    let sink = MessageBuffer::new(Box::new(LogInjector), Box::new(LogAnnouncer));
    EngineState::new(selector, decoder, Box::new(sink))
}

fn main() -> anyhow::Result<()> {
    let options = parse_options(std::env::args().skip(1))?;
    if options.help {
        print_help();
        return Ok(());
    }

    logging::install(&LogOptions::from_args(
        options.verbose,
        options.quiet,
        options.mode == RunMode::Interactive,
    ));

    let mut settings = Settings::load();
    if let Some(preset) = options.layout {
        settings.layout = preset;
    }
    let state = build_state(&settings);

    match options.mode {
        RunMode::Interactive => {
            interactive::run(state, &mut settings)?;
            // Best effort, don't fail on settings save error
            if let Err(e) = settings.save() {
                tracing::warn!(error = %e, "failed to save settings");
            }
        }
        RunMode::Replay(path) => {
            let steps = replay::load_script(&path)
                .with_context(|| format!("reading replay script {}", path.display()))?;
            let message = replay::run(&mut SteppedEngine::new(state, 0), &steps);
            println!("{message}");
        }
        RunMode::AutoType(text) => {
            let message = demo::run(&mut SteppedEngine::new(state, 0), &text)?;
            println!("{message}");
        }
    }

    Ok(())
}
