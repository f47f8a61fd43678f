//! Tick scheduling for the two cadences
//!
//! Scan ticks follow the configurable scan interval and only run while the
//! device is powered. Morse silence checks run on a fixed fast cadence.

use liberate_core::{InboundEvent, Timestamp};

/// Default cadence for Morse silence checks
pub const MORSE_CHECK_INTERVAL_MS: u64 = 100;

/// Deadline bookkeeping for scan ticks and Morse checks
#[derive(Debug, Clone)]
pub struct TickScheduler {
    scan_interval_ms: u64,
    morse_interval_ms: u64,
    next_scan: Option<Timestamp>,
    next_morse: Timestamp,
}

impl TickScheduler {
    pub fn new(scan_interval_ms: u32, now: Timestamp) -> Self {
        Self::with_morse_interval(scan_interval_ms, MORSE_CHECK_INTERVAL_MS, now)
    }

    pub fn with_morse_interval(scan_interval_ms: u32, morse_interval_ms: u64, now: Timestamp) -> Self {
        let morse_interval_ms = morse_interval_ms.max(1);
        Self {
            scan_interval_ms: u64::from(scan_interval_ms.max(1)),
            morse_interval_ms,
            next_scan: None,
            next_morse: now + morse_interval_ms,
        }
    }

    pub fn scan_interval_ms(&self) -> u64 {
        self.scan_interval_ms
    }

    /// Next scan deadline, `None` while scanning is stopped
    pub fn next_scan(&self) -> Option<Timestamp> {
        self.next_scan
    }

    /// Change the scan interval. The deadline already scheduled is kept;
    /// the new interval applies from the tick after it.
    pub fn set_scan_interval(&mut self, ms: u32) {
        self.scan_interval_ms = u64::from(ms.max(1));
    }

    /// Start or stop scan ticks (power on / power off)
    pub fn set_scanning(&mut self, active: bool, now: Timestamp) {
        match (active, self.next_scan) {
            (true, None) => self.next_scan = Some(now + self.scan_interval_ms),
            (false, Some(_)) => self.next_scan = None,
            _ => {}
        }
    }

    /// Ticks due at `now`, scan tick first.
    ///
    /// At most one of each is produced per call; after a stall the next
    /// deadline is re-anchored on `now` rather than bursting to catch up.
    pub fn poll(&mut self, now: Timestamp) -> Vec<InboundEvent> {
        let mut due = Vec::new();

        if let Some(deadline) = self.next_scan {
            if now >= deadline {
                due.push(InboundEvent::Tick);
                let mut next = deadline + self.scan_interval_ms;
                if next <= now {
                    next = now + self.scan_interval_ms;
                }
                self.next_scan = Some(next);
            }
        }

        if now >= self.next_morse {
            due.push(InboundEvent::MorseTick(now));
            let mut next = self.next_morse + self.morse_interval_ms;
            if next <= now {
                next = now + self.morse_interval_ms;
            }
            self.next_morse = next;
        }

        due
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Timestamp {
        match self.next_scan {
            Some(scan) => scan.min(self.next_morse),
            None => self.next_morse,
        }
    }
}
