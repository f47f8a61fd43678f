//! Core state machines for Liberate
//!
//! Two independent, synchronous automata with no I/O of their own:
//! - [`ScanningSelector`]: row/column scanning over a [`KeyboardLayout`],
//!   driven by ticks and a single confirm switch
//! - [`MorseDecoder`]: dot/dash marks resolved into characters by measuring
//!   silence on a periodic check
//!
//! Neither type is internally synchronized; callers deliver events from a
//! single consumer.

mod events;
mod morse;
mod scanner;
mod symbol;

pub use events::{InboundEvent, OutboundEvent};
pub use morse::{
    Mark, MorseDecoder, MorseEvent, MorseTable, MorseTimingConfig, TimingParam, Timestamp,
    UnknownTimingParam,
};
pub use scanner::{Commit, ConfirmOutcome, Cursor, Phase, ScanConfig, ScanningSelector};
pub use symbol::{KeyboardLayout, LayoutError, LayoutPreset, LayoutPresetError, Symbol, UnknownLabel};
