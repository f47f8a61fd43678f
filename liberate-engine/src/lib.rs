//! Event dispatcher for Liberate
//!
//! This crate is the caller side of the core state machines:
//! - Engine: single-consumer command queue owning selector, decoder and sink
//! - Scheduler: scan ticks and Morse silence checks from one monotonic clock
//! - Sink: message buffer relaying to key-injection and speech collaborators

mod clock;
mod engine;
mod runner;
mod scheduler;
mod sink;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{Engine, EngineCommand, EngineError, EngineEvent, EngineState};
pub use runner::{run_engine, SteppedEngine};
pub use scheduler::{TickScheduler, MORSE_CHECK_INTERVAL_MS};
pub use sink::{Announcer, InputSink, Key, KeyInjector, LogAnnouncer, LogInjector, MessageBuffer, SOS_MESSAGE};
