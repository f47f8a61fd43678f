//! Boundary events exchanged with the event source and the input sink

use crate::morse::{Mark, MorseEvent, Timestamp};
use crate::scanner::{Commit, Cursor, Phase};
use crate::symbol::Symbol;

/// Discrete events delivered to the core, in a single total order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// Scan tick: advance the highlight
    Tick,
    /// Binary switch signal
    Confirm,
    MarkDot(Timestamp),
    MarkDash(Timestamp),
    /// Periodic Morse silence check at the given time
    MorseTick(Timestamp),
    PowerOn,
    PowerOff,
}

impl InboundEvent {
    /// Build a mark event
    pub fn mark(mark: Mark, at: Timestamp) -> Self {
        match mark {
            Mark::Dot => InboundEvent::MarkDot(at),
            Mark::Dash => InboundEvent::MarkDash(at),
        }
    }
}

/// Decisions handed to the input sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundEvent {
    SymbolCommitted(Symbol),
    CursorMoved { row: usize, col: usize, phase: Phase },
    CharacterDecoded(char),
    WordBoundary,
}

impl From<Cursor> for OutboundEvent {
    fn from(cursor: Cursor) -> Self {
        OutboundEvent::CursorMoved {
            row: cursor.row,
            col: cursor.col,
            phase: cursor.phase,
        }
    }
}

impl From<Commit> for OutboundEvent {
    fn from(commit: Commit) -> Self {
        OutboundEvent::SymbolCommitted(commit.symbol)
    }
}

impl From<MorseEvent> for OutboundEvent {
    fn from(event: MorseEvent) -> Self {
        match event {
            MorseEvent::Character(c) => OutboundEvent::CharacterDecoded(c),
            MorseEvent::WordBoundary => OutboundEvent::WordBoundary,
        }
    }
}
