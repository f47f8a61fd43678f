//! Engine - owns the state machines and the input sink

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use liberate_core::{
    ConfirmOutcome, InboundEvent, KeyboardLayout, Mark, MorseDecoder, MorseTimingConfig,
    OutboundEvent, ScanningSelector, TimingParam,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::sink::InputSink;

/// Commands sent to the engine thread
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Raw event from the clock, switch or Morse key
    Input(InboundEvent),
    TogglePower,

    // Scan speed
    SetTickInterval(u32),
    Faster,
    Slower,

    // Morse timing
    SetTiming(TimingParam, u32),
    AdjustTiming(TimingParam, i64),

    // Message editing
    ClearMorse,
    AddSpace,
    MorseBackspace,
    Speak,

    SetLayout(KeyboardLayout),
    ResetCursor,

    Shutdown,
}

/// Events sent from the engine thread
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Decision also delivered to the input sink
    Output(OutboundEvent),
    PowerChanged(bool),
    TickIntervalChanged(u32),
    TimingChanged(MorseTimingConfig),
    /// Pending Morse code after a change
    MorsePending(String),
    /// Full message after a change
    MessageChanged(String),
    LayoutChanged(KeyboardLayout),
}

/// Errors from the engine handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine command queue is full")]
    QueueFull,
    #[error("Engine thread has stopped")]
    Disconnected,
}

/// Engine state (held in the engine thread)
pub struct EngineState {
    selector: ScanningSelector,
    decoder: MorseDecoder,
    sink: Box<dyn InputSink>,
}

impl EngineState {
    pub fn new(selector: ScanningSelector, decoder: MorseDecoder, sink: Box<dyn InputSink>) -> Self {
        Self {
            selector,
            decoder,
            sink,
        }
    }

    pub fn selector(&self) -> &ScanningSelector {
        &self.selector
    }

    pub fn decoder(&self) -> &MorseDecoder {
        &self.decoder
    }

    pub fn message(&self) -> &str {
        self.sink.text()
    }

    /// Process a command and return the events it produced
    pub fn handle_command(&mut self, cmd: EngineCommand) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let message_before = self.sink.text().len();
        let pending_before = self.decoder.pending().len();

        match cmd {
            EngineCommand::Input(event) => self.handle_input(event, &mut events),
            EngineCommand::TogglePower => {
                let event = if self.selector.is_powered() {
                    InboundEvent::PowerOff
                } else {
                    InboundEvent::PowerOn
                };
                self.handle_input(event, &mut events);
            }

            EngineCommand::SetTickInterval(ms) => {
                let ms = self.selector.set_tick_interval(ms);
                events.push(EngineEvent::TickIntervalChanged(ms));
            }
            EngineCommand::Faster => {
                events.push(EngineEvent::TickIntervalChanged(self.selector.faster()));
            }
            EngineCommand::Slower => {
                events.push(EngineEvent::TickIntervalChanged(self.selector.slower()));
            }

            EngineCommand::SetTiming(param, ms) => {
                self.decoder.set_timing(param, ms);
                events.push(EngineEvent::TimingChanged(self.decoder.timing()));
            }
            EngineCommand::AdjustTiming(param, delta) => {
                self.decoder.adjust_timing(param, delta);
                events.push(EngineEvent::TimingChanged(self.decoder.timing()));
            }

            EngineCommand::ClearMorse => self.decoder.clear(),
            EngineCommand::AddSpace => {
                self.decoder.clear();
                self.emit(OutboundEvent::WordBoundary, &mut events);
            }
            EngineCommand::MorseBackspace => {
                if self.decoder.pending().is_empty() {
                    self.sink.backspace();
                } else {
                    self.decoder.clear();
                }
            }
            EngineCommand::Speak => self.sink.speak(),

            EngineCommand::SetLayout(layout) => {
                self.selector.set_layout(layout.clone());
                events.push(EngineEvent::LayoutChanged(layout));
                self.emit(self.selector.cursor().into(), &mut events);
            }
            EngineCommand::ResetCursor => {
                self.selector.reset();
                self.emit(self.selector.cursor().into(), &mut events);
            }

            // Handled by the run loop
            EngineCommand::Shutdown => {}
        }

        // Every path above appends to or truncates these, so length tracks edits
        if self.sink.text().len() != message_before {
            events.push(EngineEvent::MessageChanged(self.sink.text().to_string()));
        }
        if self.decoder.pending().len() != pending_before {
            events.push(EngineEvent::MorsePending(self.decoder.pending().to_string()));
        }

        events
    }

    fn handle_input(&mut self, event: InboundEvent, events: &mut Vec<EngineEvent>) {
        match event {
            InboundEvent::Tick => {
                if let Some(cursor) = self.selector.on_tick() {
                    self.emit(cursor.into(), events);
                }
            }
            InboundEvent::Confirm => match self.selector.on_confirm() {
                Some(ConfirmOutcome::RowLocked(cursor)) => self.emit(cursor.into(), events),
                Some(ConfirmOutcome::Committed(commit)) => {
                    self.emit(commit.into(), events);
                    self.emit(self.selector.cursor().into(), events);
                }
                None => tracing::debug!("confirm ignored while powered off"),
            },
            InboundEvent::MarkDot(at) => self.decoder.add_mark(Mark::Dot, at),
            InboundEvent::MarkDash(at) => self.decoder.add_mark(Mark::Dash, at),
            InboundEvent::MorseTick(now) => {
                for decoded in self.decoder.on_tick(now) {
                    self.emit(decoded.into(), events);
                }
            }
            InboundEvent::PowerOn => {
                self.selector.power_on();
                tracing::info!("power on");
                events.push(EngineEvent::PowerChanged(true));
            }
            InboundEvent::PowerOff => {
                self.selector.power_off();
                tracing::info!("power off");
                events.push(EngineEvent::PowerChanged(false));
            }
        }
    }

    /// Deliver to the sink and report to the UI
    fn emit(&mut self, event: OutboundEvent, events: &mut Vec<EngineEvent>) {
        self.sink.deliver(&event);
        events.push(EngineEvent::Output(event));
    }
}

/// Handle for communicating with the engine thread
pub struct Engine {
    /// Send commands to the engine thread
    pub command_tx: Sender<EngineCommand>,
    /// Receive events from the engine thread
    pub event_rx: Receiver<EngineEvent>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl Engine {
    /// Create channels for engine communication
    pub fn create_channels() -> (
        Sender<EngineCommand>,
        Receiver<EngineCommand>,
        Sender<EngineEvent>,
        Receiver<EngineEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(1024);
        let (evt_tx, evt_rx) = bounded(1024);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(
        command_tx: Sender<EngineCommand>,
        event_rx: Receiver<EngineEvent>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            command_tx,
            event_rx,
            shutdown,
        }
    }

    /// Queue a command for the engine thread
    pub fn send(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        self.command_tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => EngineError::QueueFull,
            TrySendError::Disconnected(_) => EngineError::Disconnected,
        })
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.command_tx.try_send(EngineCommand::Shutdown);
    }
}
