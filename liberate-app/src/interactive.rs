//! Interactive terminal front end
//!
//! The terminal stands in for the switch: key presses become commands for
//! the engine thread, and engine events redraw a plain status display.

use std::io::{self, Stdout, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event},
    execute, queue,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use liberate_core::{KeyboardLayout, MorseTimingConfig, OutboundEvent, Phase, Cursor, TimingParam};
use liberate_engine::{run_engine, Clock, Engine, EngineEvent, EngineState, MonotonicClock};
use liberate_input::{Command, InputHandler, Mode};
use liberate_settings::Settings;

use crate::dispatch;

/// Input poll interval
const FRAME: Duration = Duration::from_millis(20);

/// Everything shown on screen, rebuilt from engine events
#[derive(Debug, Clone)]
pub struct Status {
    pub mode: Mode,
    pub command_buffer: String,
    pub powered: bool,
    pub cursor: Cursor,
    pub layout: KeyboardLayout,
    pub tick_interval_ms: u32,
    pub timing: MorseTimingConfig,
    pub pending: String,
    pub message: String,
    /// Configured sensor port, shown so the user can check the wiring
    pub serial_port: Option<String>,
    /// One-line feedback for the last command
    pub notice: String,
}

impl Status {
    pub fn new(state: &EngineState, serial_port: Option<&str>) -> Self {
        let selector = state.selector();
        Self {
            mode: Mode::default(),
            command_buffer: String::new(),
            powered: selector.is_powered(),
            cursor: selector.cursor(),
            layout: selector.layout().clone(),
            tick_interval_ms: selector.config().tick_interval_ms(),
            timing: state.decoder().timing(),
            pending: state.decoder().pending().to_string(),
            message: state.message().to_string(),
            serial_port: serial_port.map(str::to_string),
            notice: "Press p to power on, Tab for Morse, : for commands, Ctrl-q to quit".into(),
        }
    }

    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Output(OutboundEvent::CursorMoved { row, col, phase }) => {
                self.cursor = Cursor {
                    row: *row,
                    col: *col,
                    phase: *phase,
                };
            }
            EngineEvent::Output(OutboundEvent::SymbolCommitted(symbol)) => {
                self.notice = format!("Selected {}", symbol.label());
            }
            EngineEvent::Output(_) => {}
            EngineEvent::PowerChanged(powered) => {
                self.powered = *powered;
                self.notice = format!("Power {}", if *powered { "on" } else { "off" });
            }
            EngineEvent::TickIntervalChanged(ms) => {
                self.tick_interval_ms = *ms;
                self.notice = format!("Scan interval {ms} ms");
            }
            EngineEvent::TimingChanged(timing) => self.timing = *timing,
            EngineEvent::MorsePending(code) => self.pending.clone_from(code),
            EngineEvent::MessageChanged(text) => self.message.clone_from(text),
            EngineEvent::LayoutChanged(layout) => {
                self.layout = layout.clone();
                self.cursor = Cursor::default();
            }
        }
    }

    /// Screen lines, top to bottom
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let mode = match self.mode {
            Mode::Command => format!(":{}", self.command_buffer),
            mode => mode.display_name().to_string(),
        };
        lines.push(format!(
            "[{}] power {} | {} row {} col {} | scan {} ms | device {}",
            mode,
            if self.powered { "ON" } else { "OFF" },
            self.cursor.phase.display_name(),
            self.cursor.row,
            self.cursor.col,
            self.tick_interval_ms,
            self.serial_port.as_deref().unwrap_or("none"),
        ));
        lines.push(String::new());

        for (row_idx, row) in self.layout.rows().iter().enumerate() {
            let on_row = row_idx == self.cursor.row;
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(col_idx, symbol)| {
                    let label = symbol.label();
                    let lit = on_row && self.cursor.phase == Phase::Column && col_idx == self.cursor.col;
                    if lit {
                        format!("[{label}]")
                    } else {
                        format!(" {label} ")
                    }
                })
                .collect();
            let marker = if on_row && self.cursor.phase == Phase::Row { ">" } else { " " };
            lines.push(format!("{marker} {}", cells.join("")));
        }
        lines.push(String::new());

        let timing = TimingParam::ALL
            .iter()
            .map(|p| format!("{p} {}", self.timing.get(*p)))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Morse: {:<8} ({timing})", self.pending));
        lines.push(format!("Message: {}", self.message.replace('\n', "⏎")));
        lines.push(self.notice.clone());
        lines
    }
}

/// Run the terminal session until the user quits
pub fn run(state: EngineState, settings: &mut Settings) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let clock = MonotonicClock::new();
    let mut status = Status::new(&state, settings.serial_port.as_deref());

    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = Engine::create_channels();
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_engine = shutdown.clone();
    let engine_handle = thread::spawn(move || {
        run_engine(state, clock, cmd_rx, evt_tx, shutdown_engine);
    });
    let engine = Engine::new(cmd_tx, evt_rx, shutdown);

    let result = event_loop(&mut stdout, &engine, clock, &mut status, settings);

    engine.shutdown();
    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;
    let _ = engine_handle.join();

    if !status.message.is_empty() {
        println!("{}", status.message);
    }
    result
}

fn event_loop(
    stdout: &mut Stdout,
    engine: &Engine,
    clock: MonotonicClock,
    status: &mut Status,
    settings: &mut Settings,
) -> anyhow::Result<()> {
    let mut input = InputHandler::new();
    let mut dirty = true;

    loop {
        while let Ok(event) = engine.event_rx.try_recv() {
            dispatch::track_event(settings, &event);
            status.apply(&event);
            dirty = true;
        }

        if dirty {
            draw(stdout, status)?;
            dirty = false;
        }

        if !event::poll(FRAME)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(cmd) = input.handle_key(key) else {
            continue;
        };

        match &cmd {
            Command::Quit => break,
            Command::ResetBaseline => {
                dispatch::request_baseline_reset(settings.serial_port.as_deref());
                status.notice = "Baseline reset requested".into();
            }
            Command::ExecuteCommand(line) => {
                status.notice = format!("Unknown command: {line}");
            }
            _ => {
                dispatch::track_settings(settings, &cmd);
                if let Some(engine_cmd) = dispatch::to_engine(&cmd, clock.now_ms()) {
                    if let Err(e) = engine.send(engine_cmd) {
                        tracing::warn!(error = %e, "command dropped");
                        status.notice = e.to_string();
                    }
                }
            }
        }

        status.mode = input.mode();
        status.command_buffer = input.command_buffer().to_string();
        dirty = true;
    }

    Ok(())
}

fn draw(stdout: &mut Stdout, status: &Status) -> io::Result<()> {
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    for (y, line) in status.render_lines().iter().enumerate() {
        let y = u16::try_from(y).unwrap_or(u16::MAX);
        queue!(stdout, MoveTo(0, y), Print(line))?;
    }
    stdout.flush()
}
