//! Auto-type demo driver
//!
//! Types a text through the scanning selector by watching its output and
//! confirming whenever the highlight reaches the next target, the same way a
//! user with a single switch would.

use std::collections::VecDeque;

use liberate_core::{KeyboardLayout, OutboundEvent, Phase, Symbol};

use crate::commands::Command;

/// Watches selector output and confirms at the right moments
#[derive(Debug, Clone)]
pub struct AutoTyper {
    layout: KeyboardLayout,
    targets: VecDeque<Symbol>,
    /// Phase the next cursor update must be in after a confirm was issued.
    /// Updates already queued before the confirm landed are ignored.
    awaiting: Option<Phase>,
}

impl AutoTyper {
    /// Plan the symbols for `text`. Characters with no key in `layout` are
    /// dropped; `Speak` is appended when the layout offers it.
    pub fn new(text: &str, layout: &KeyboardLayout) -> Self {
        let mut targets = VecDeque::new();

        for c in text.chars().flat_map(char::to_uppercase) {
            let symbol = Symbol::from(c);
            if layout.position_of(symbol).is_some() {
                targets.push_back(symbol);
            } else {
                tracing::debug!(character = %c, "no key for character, skipping");
            }
        }
        if layout.position_of(Symbol::Speak).is_some() {
            targets.push_back(Symbol::Speak);
        }

        tracing::info!(symbols = targets.len(), "auto-type planned");
        Self {
            layout: layout.clone(),
            targets,
            awaiting: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.targets.is_empty()
    }

    /// Symbols still to be committed
    pub fn remaining(&self) -> usize {
        self.targets.len()
    }

    pub fn next_target(&self) -> Option<Symbol> {
        self.targets.front().copied()
    }

    /// Feed one selector output; returns `Confirm` when the switch should fire
    pub fn on_event(&mut self, event: &OutboundEvent) -> Option<Command> {
        match *event {
            OutboundEvent::CursorMoved { row, col, phase } => self.on_cursor(row, col, phase),
            OutboundEvent::SymbolCommitted(symbol) => {
                self.on_commit(symbol);
                None
            }
            OutboundEvent::CharacterDecoded(_) | OutboundEvent::WordBoundary => None,
        }
    }

    fn on_cursor(&mut self, row: usize, col: usize, phase: Phase) -> Option<Command> {
        if let Some(expected) = self.awaiting {
            if phase != expected {
                return None;
            }
            self.awaiting = None;
        }

        let target = self.next_target()?;
        let (target_row, target_col) = self.layout.position_of(target)?;

        let fire = match phase {
            Phase::Row => row == target_row,
            Phase::Column if row == target_row => col == target_col,
            // Locked the wrong row: leave through Skip, or commit and correct
            Phase::Column => {
                // A row this layout lacks comes from some other grid
                let escape = self
                    .layout
                    .rows()
                    .get(row)?
                    .iter()
                    .position(|s| *s == Symbol::Skip)
                    .unwrap_or(0);
                col == escape
            }
        };

        if !fire {
            return None;
        }
        self.awaiting = Some(match phase {
            Phase::Row => Phase::Column,
            Phase::Column => Phase::Row,
        });
        Some(Command::Confirm)
    }

    fn on_commit(&mut self, symbol: Symbol) {
        let Some(target) = self.next_target() else {
            return;
        };

        if symbol == target {
            self.targets.pop_front();
            tracing::debug!(%symbol, remaining = self.targets.len(), "auto-type progress");
        } else if symbol == Symbol::Skip {
            // Nothing typed, retry the same target
        } else if self.layout.position_of(Symbol::Backspace).is_some() {
            tracing::warn!(%symbol, expected = %target, "auto-type committed wrong symbol, correcting");
            self.targets.push_front(Symbol::Backspace);
        } else {
            tracing::warn!(%symbol, expected = %target, "auto-type committed wrong symbol");
        }
    }
}
