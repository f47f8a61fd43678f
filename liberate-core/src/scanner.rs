//! Row/column scanning selector
//!
//! A periodic tick advances a highlight over the rows of a
//! [`KeyboardLayout`]; a confirm signal locks the row, after which ticks
//! advance over the columns of that row and a second confirm commits the
//! highlighted symbol.
//!
//! ```text
//!            tick: row+1            tick: col+1
//!           ┌────────┐             ┌────────┐
//!           ▼        │  confirm    ▼        │
//!        [ RowPhase ]─┴──────────▶[ ColPhase ]─┘
//!             ▲          col = 0       │
//!             └────────────────────────┘
//!               confirm: commit rows[row][col]
//! ```

use std::time::Duration;

use crate::symbol::{KeyboardLayout, Symbol};

/// Which axis the cursor is currently scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Row,
    Column,
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Row => "ROW",
            Phase::Column => "COL",
        }
    }
}

/// Current highlight position.
///
/// In [`Phase::Row`] only `row` is meaningful and `col` is kept at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    pub phase: Phase,
}

/// Scan timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    tick_interval_ms: u32,
}

impl ScanConfig {
    pub const MIN_INTERVAL_MS: u32 = 100;
    pub const MAX_INTERVAL_MS: u32 = 3000;
    pub const DEFAULT_INTERVAL_MS: u32 = 1000;
    /// Step used by [`faster`](Self::faster) and [`slower`](Self::slower)
    pub const STEP_MS: u32 = 100;

    pub fn new(tick_interval_ms: u32) -> Self {
        let mut config = Self {
            tick_interval_ms: Self::DEFAULT_INTERVAL_MS,
        };
        config.set_tick_interval(tick_interval_ms);
        config
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    /// Set the interval, clamped to `[MIN_INTERVAL_MS, MAX_INTERVAL_MS]`.
    /// Returns the value actually stored.
    pub fn set_tick_interval(&mut self, ms: u32) -> u32 {
        let clamped = ms.clamp(Self::MIN_INTERVAL_MS, Self::MAX_INTERVAL_MS);
        if clamped != ms {
            tracing::debug!(requested = ms, clamped, "scan interval clamped");
        }
        self.tick_interval_ms = clamped;
        clamped
    }

    /// Shorten the interval by one step
    pub fn faster(&mut self) -> u32 {
        self.set_tick_interval(self.tick_interval_ms.saturating_sub(Self::STEP_MS))
    }

    /// Lengthen the interval by one step
    pub fn slower(&mut self) -> u32 {
        self.set_tick_interval(self.tick_interval_ms.saturating_add(Self::STEP_MS))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL_MS)
    }
}

/// A committed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub symbol: Symbol,
    pub row: usize,
    pub col: usize,
}

/// Result of a confirm that had an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Row locked, column scanning starts at this cursor
    RowLocked(Cursor),
    /// Symbol committed; the cursor is back in row phase
    Committed(Commit),
}

/// Scanning keyboard state machine.
///
/// Pure value type: no timers, no I/O. Ticks and confirms arrive from the
/// caller in a single total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanningSelector {
    layout: KeyboardLayout,
    cursor: Cursor,
    config: ScanConfig,
    powered: bool,
}

impl ScanningSelector {
    /// Create a selector at `(0, 0, Row)`, powered off
    pub fn new(layout: KeyboardLayout, config: ScanConfig) -> Self {
        Self {
            layout,
            cursor: Cursor::default(),
            config,
            powered: false,
        }
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn config(&self) -> ScanConfig {
        self.config
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Symbol under the cursor (column phase only)
    pub fn highlighted(&self) -> Option<Symbol> {
        match self.cursor.phase {
            Phase::Row => None,
            Phase::Column => self.layout.get(self.cursor.row, self.cursor.col),
        }
    }

    /// Advance the highlight. Returns the new cursor, or `None` when powered off.
    pub fn on_tick(&mut self) -> Option<Cursor> {
        if !self.powered {
            return None;
        }

        match self.cursor.phase {
            Phase::Row => {
                self.cursor.row = (self.cursor.row + 1) % self.layout.row_count();
            }
            Phase::Column => {
                // Row length is re-read every time: rows are ragged
                let len = self.layout.row_len(self.cursor.row);
                self.cursor.col = (self.cursor.col + 1) % len;
            }
        }
        Some(self.cursor)
    }

    /// Handle the binary confirm signal. `None` when powered off.
    pub fn on_confirm(&mut self) -> Option<ConfirmOutcome> {
        if !self.powered {
            return None;
        }

        match self.cursor.phase {
            Phase::Row => {
                self.cursor.phase = Phase::Column;
                self.cursor.col = 0;
                tracing::debug!(row = self.cursor.row, "row locked");
                Some(ConfirmOutcome::RowLocked(self.cursor))
            }
            Phase::Column => {
                let Cursor { row, col, .. } = self.cursor;
                self.cursor.phase = Phase::Row;
                self.cursor.col = 0;
                // Cursor is kept in range by construction and modulo updates
                let symbol = self.layout.get(row, col)?;
                tracing::info!(%symbol, row, col, "symbol committed");
                Some(ConfirmOutcome::Committed(Commit { symbol, row, col }))
            }
        }
    }

    /// Change the scan interval (clamped). Only future scheduling is affected.
    pub fn set_tick_interval(&mut self, ms: u32) -> u32 {
        self.config.set_tick_interval(ms)
    }

    pub fn faster(&mut self) -> u32 {
        self.config.faster()
    }

    pub fn slower(&mut self) -> u32 {
        self.config.slower()
    }

    pub fn power_on(&mut self) {
        self.powered = true;
    }

    /// Gate ticks and confirms off. The cursor is kept so scanning resumes
    /// where it stopped.
    pub fn power_off(&mut self) {
        self.powered = false;
    }

    /// Return to `(0, 0, Row)`
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
    }

    /// Swap the layout and reset the cursor
    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = layout;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> KeyboardLayout {
        KeyboardLayout::new(vec![
            vec![Symbol::Char('A'), Symbol::Char('B')],
            vec![Symbol::Char('C'), Symbol::Char('D'), Symbol::Skip],
        ])
        .unwrap()
    }

    fn powered(layout: KeyboardLayout) -> ScanningSelector {
        let mut selector = ScanningSelector::new(layout, ScanConfig::default());
        selector.power_on();
        selector
    }

    #[test]
    fn test_initial_state() {
        let selector = ScanningSelector::new(sample_layout(), ScanConfig::default());
        assert_eq!(selector.cursor(), Cursor { row: 0, col: 0, phase: Phase::Row });
        assert!(!selector.is_powered());
        assert_eq!(selector.highlighted(), None);
    }

    #[test]
    fn test_row_cycle_returns_to_start() {
        for layout in [sample_layout(), KeyboardLayout::classic(), KeyboardLayout::assistive()] {
            let rows = layout.row_count();
            let mut selector = powered(layout);
            let start = selector.cursor();
            for _ in 0..rows {
                selector.on_tick();
            }
            assert_eq!(selector.cursor(), start);
        }
    }

    #[test]
    fn test_column_cycle_uses_own_row_length() {
        let layout = KeyboardLayout::assistive();
        for row in 0..layout.row_count() {
            let mut selector = powered(layout.clone());
            for _ in 0..row {
                selector.on_tick();
            }
            selector.on_confirm();
            let start = selector.cursor();
            assert_eq!(start, Cursor { row, col: 0, phase: Phase::Column });

            for step in 1..layout.row_len(row) {
                let cursor = selector.on_tick().unwrap();
                assert_eq!(cursor.col, step);
            }
            selector.on_tick();
            assert_eq!(selector.cursor(), start);
        }
    }

    #[test]
    fn test_confirm_in_row_phase_resets_column() {
        let mut selector = powered(sample_layout());
        selector.on_tick();
        selector.on_confirm();
        selector.on_tick();
        selector.on_tick();
        assert_eq!(selector.cursor().col, 2);

        // Commit Skip, then lock the row again
        selector.on_confirm();
        let outcome = selector.on_confirm().unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::RowLocked(Cursor { row: 1, col: 0, phase: Phase::Column })
        );
    }

    #[test]
    fn test_confirm_in_column_phase_commits_once() {
        let mut selector = powered(sample_layout());
        selector.on_confirm();
        selector.on_tick();

        let outcome = selector.on_confirm().unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::Committed(Commit { symbol: Symbol::Char('B'), row: 0, col: 1 })
        );
        assert_eq!(selector.cursor(), Cursor { row: 0, col: 0, phase: Phase::Row });
    }

    #[test]
    fn test_scenario_commits_d() {
        let mut selector = powered(sample_layout());

        assert_eq!(selector.on_tick().unwrap().row, 1);
        assert_eq!(
            selector.on_confirm(),
            Some(ConfirmOutcome::RowLocked(Cursor { row: 1, col: 0, phase: Phase::Column }))
        );
        assert_eq!(selector.on_tick().unwrap().col, 1);
        assert_eq!(selector.highlighted(), Some(Symbol::Char('D')));

        match selector.on_confirm() {
            Some(ConfirmOutcome::Committed(commit)) => {
                assert_eq!(commit.symbol, Symbol::Char('D'));
                assert_eq!((commit.row, commit.col), (1, 1));
            }
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_single_column_row_needs_confirm() {
        let layout =
            KeyboardLayout::new(vec![vec![Symbol::Char('X')], vec![Symbol::Char('Y')]]).unwrap();
        let mut selector = powered(layout);

        selector.on_confirm();
        assert_eq!(selector.cursor().phase, Phase::Column);
        // Ticks wrap on the single column without committing
        selector.on_tick();
        selector.on_tick();
        assert_eq!(selector.cursor(), Cursor { row: 0, col: 0, phase: Phase::Column });

        assert!(matches!(
            selector.on_confirm(),
            Some(ConfirmOutcome::Committed(Commit { symbol: Symbol::Char('X'), .. }))
        ));
    }

    #[test]
    fn test_powered_off_is_noop() {
        let mut selector = powered(sample_layout());
        selector.on_tick();
        selector.on_confirm();
        selector.power_off();

        let before = selector.clone();
        assert_eq!(selector.on_tick(), None);
        assert_eq!(selector.on_confirm(), None);
        assert_eq!(selector, before);
    }

    #[test]
    fn test_power_cycle_keeps_cursor() {
        let mut selector = powered(sample_layout());
        selector.on_tick();
        selector.power_off();
        selector.power_on();
        assert_eq!(selector.cursor().row, 1);

        selector.reset();
        assert_eq!(selector.cursor(), Cursor::default());
    }

    #[test]
    fn test_set_layout_resets_cursor() {
        let mut selector = powered(KeyboardLayout::classic());
        selector.on_tick();
        selector.on_tick();
        selector.set_layout(sample_layout());
        assert_eq!(selector.cursor(), Cursor::default());
        assert_eq!(selector.layout().row_count(), 2);
    }

    #[test]
    fn test_interval_clamping() {
        let mut config = ScanConfig::new(50);
        assert_eq!(config.tick_interval_ms(), ScanConfig::MIN_INTERVAL_MS);
        assert_eq!(config.set_tick_interval(10_000), ScanConfig::MAX_INTERVAL_MS);
        assert_eq!(config.slower(), ScanConfig::MAX_INTERVAL_MS);

        config.set_tick_interval(150);
        assert_eq!(config.faster(), 100);
        assert_eq!(config.faster(), 100);
        assert_eq!(config.slower(), 200);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_speed_keys_step_100ms() {
        let mut config = ScanConfig::default();
        assert_eq!(config.faster(), 900);
        assert_eq!(config.faster(), 800);
        assert_eq!(config.slower(), 900);

        config.set_tick_interval(2_950);
        assert_eq!(config.slower(), ScanConfig::MAX_INTERVAL_MS);
    }

    #[test]
    fn test_interval_change_keeps_cursor() {
        let mut selector = powered(sample_layout());
        selector.on_tick();
        let cursor = selector.cursor();
        assert_eq!(selector.set_tick_interval(400), 400);
        assert_eq!(selector.cursor(), cursor);
        assert_eq!(selector.config().tick_interval_ms(), 400);
    }
}
