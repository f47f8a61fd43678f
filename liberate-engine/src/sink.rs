//! Input sink and the collaborators it relays to
//!
//! The sink turns decisions from the state machines into a typed message.
//! Key injection and speech are collaborators behind traits so the same
//! sink serves hardware and simulated deployments.

use liberate_core::{OutboundEvent, Symbol};

/// Keys pressed (rather than typed as text) on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Backspace,
    Enter,
}

/// Relays typed output to the outside world
pub trait KeyInjector: Send {
    fn write(&mut self, text: &str);
    fn press(&mut self, key: Key);
}

/// Speech and alert collaborator
pub trait Announcer: Send {
    fn speak(&mut self, text: &str);
    fn alert(&mut self, message: &str);
}

/// Consumer of the engine's outbound decisions
pub trait InputSink: Send {
    /// Apply one outbound event
    fn deliver(&mut self, event: &OutboundEvent);
    /// Delete the last typed character
    fn backspace(&mut self);
    /// Read the message aloud
    fn speak(&mut self);
    /// Message typed so far
    fn text(&self) -> &str;
}

/// Alert text for the SOS key
pub const SOS_MESSAGE: &str = "SOS Alert Triggered!";

/// Message buffer that relays every edit to a [`KeyInjector`]
pub struct MessageBuffer {
    message: String,
    injector: Box<dyn KeyInjector>,
    announcer: Box<dyn Announcer>,
}

impl MessageBuffer {
    pub fn new(injector: Box<dyn KeyInjector>, announcer: Box<dyn Announcer>) -> Self {
        Self {
            message: String::new(),
            injector,
            announcer,
        }
    }

    fn push_char(&mut self, c: char) {
        self.message.push(c);
        match c {
            ' ' => self.injector.press(Key::Space),
            '\n' => self.injector.press(Key::Enter),
            c => {
                let mut buf = [0u8; 4];
                self.injector.write(c.encode_utf8(&mut buf));
            }
        }
    }

    fn commit(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::Char(c) => self.push_char(c),
            Symbol::Space => self.push_char(' '),
            Symbol::Enter => self.push_char('\n'),
            Symbol::Backspace => self.backspace(),
            Symbol::Skip => {}
            Symbol::Speak => self.speak(),
            Symbol::Sos => {
                tracing::warn!("SOS selected");
                self.announcer.alert(SOS_MESSAGE);
            }
        }
    }
}

impl InputSink for MessageBuffer {
    fn deliver(&mut self, event: &OutboundEvent) {
        match *event {
            OutboundEvent::SymbolCommitted(symbol) => self.commit(symbol),
            OutboundEvent::CharacterDecoded(c) => self.push_char(c),
            OutboundEvent::WordBoundary => self.push_char(' '),
            OutboundEvent::CursorMoved { .. } => {}
        }
    }

    fn backspace(&mut self) {
        if self.message.pop().is_some() {
            self.injector.press(Key::Backspace);
        }
    }

    fn speak(&mut self) {
        if !self.message.is_empty() {
            self.announcer.speak(&self.message);
        }
    }

    fn text(&self) -> &str {
        &self.message
    }
}

/// Injector that only logs; no host keystrokes are generated
#[derive(Debug, Default)]
pub struct LogInjector;

impl KeyInjector for LogInjector {
    fn write(&mut self, text: &str) {
        tracing::info!(text, "type");
    }

    fn press(&mut self, key: Key) {
        tracing::info!(?key, "press");
    }
}

/// Announcer that logs instead of synthesizing speech
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn speak(&mut self, text: &str) {
        tracing::info!(text, "speak");
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!(message, "alert");
    }
}
