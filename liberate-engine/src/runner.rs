//! Engine drivers
//!
//! [`run_engine`] is the engine thread loop: single consumer of the command
//! queue and sole mutator of the engine state. Both tick cadences are
//! generated there from one clock, so ticks, switch events and configuration
//! changes share a total order.
//!
//! [`SteppedEngine`] runs the same state on virtual time in the caller's
//! thread, for replays and the auto-type demo.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use liberate_core::Timestamp;

use crate::clock::Clock;
use crate::engine::{EngineCommand, EngineEvent, EngineState};
use crate::scheduler::TickScheduler;

/// Upper bound on how long the loop waits for a command before re-checking
/// tick deadlines
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run the engine until `Shutdown`, the shutdown flag, or all senders drop
pub fn run_engine<C: Clock>(
    mut state: EngineState,
    clock: C,
    cmd_rx: Receiver<EngineCommand>,
    evt_tx: Sender<EngineEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let now = clock.now_ms();
    let mut scheduler = TickScheduler::new(state.selector().config().tick_interval_ms(), now);
    scheduler.set_scanning(state.selector().is_powered(), now);

    tracing::debug!("engine thread started");

    while !shutdown.load(Ordering::Relaxed) {
        let now = clock.now_ms();
        for tick in scheduler.poll(now) {
            let events = state.handle_command(EngineCommand::Input(tick));
            forward(&mut scheduler, now, events, &evt_tx);
        }

        let wait = Duration::from_millis(scheduler.next_deadline().saturating_sub(now)).min(POLL_INTERVAL);
        match cmd_rx.recv_timeout(wait) {
            Ok(EngineCommand::Shutdown) => break,
            Ok(cmd) => {
                let events = state.handle_command(cmd);
                forward(&mut scheduler, clock.now_ms(), events, &evt_tx);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!("engine thread stopped");
}

/// Apply scheduling side effects, then pass events to the UI
fn forward(
    scheduler: &mut TickScheduler,
    now: u64,
    events: Vec<EngineEvent>,
    evt_tx: &Sender<EngineEvent>,
) {
    for event in events {
        reschedule(scheduler, now, &event);
        if evt_tx.try_send(event).is_err() {
            tracing::warn!("engine event dropped, UI not keeping up");
        }
    }
}

fn reschedule(scheduler: &mut TickScheduler, now: Timestamp, event: &EngineEvent) {
    match *event {
        EngineEvent::PowerChanged(powered) => scheduler.set_scanning(powered, now),
        EngineEvent::TickIntervalChanged(ms) => scheduler.set_scan_interval(ms),
        _ => {}
    }
}

/// Engine state driven on virtual time
pub struct SteppedEngine {
    state: EngineState,
    scheduler: TickScheduler,
    now: Timestamp,
}

impl SteppedEngine {
    pub fn new(state: EngineState, start: Timestamp) -> Self {
        let mut scheduler = TickScheduler::new(state.selector().config().tick_interval_ms(), start);
        scheduler.set_scanning(state.selector().is_powered(), start);
        Self {
            state,
            scheduler,
            now: start,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Apply a command at the current virtual time
    pub fn handle(&mut self, cmd: EngineCommand) -> Vec<EngineEvent> {
        let events = self.state.handle_command(cmd);
        for event in &events {
            reschedule(&mut self.scheduler, self.now, event);
        }
        events
    }

    /// Move virtual time forward, firing every tick that falls due on the way
    pub fn advance(&mut self, delta_ms: u64) -> Vec<EngineEvent> {
        self.advance_until(delta_ms, |_| false)
    }

    /// Like [`advance`](Self::advance) but stops right after the tick whose
    /// events satisfy `stop`. Returns everything produced up to there.
    pub fn advance_until(
        &mut self,
        delta_ms: u64,
        mut stop: impl FnMut(&[EngineEvent]) -> bool,
    ) -> Vec<EngineEvent> {
        let target = self.now.saturating_add(delta_ms);
        let mut produced = Vec::new();

        while self.scheduler.next_deadline() <= target {
            self.now = self.now.max(self.scheduler.next_deadline());
            let mut batch = Vec::new();
            for tick in self.scheduler.poll(self.now) {
                let cmd = EngineCommand::Input(tick);
                batch.extend(self.handle(cmd));
            }
            let done = stop(batch.as_slice());
            produced.extend(batch);
            if done {
                return produced;
            }
        }

        self.now = target;
        produced
    }
}
