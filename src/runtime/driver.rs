//! The match actor.
//!
//! One tokio task owns the `TurnScheduler` and is the only code that
//! touches it. It multiplexes player requests, the one-second match
//! clock and the scheduler's armed timers, then forwards the resulting
//! events to subscribers and ports. Dropping the actor drops every timer
//! with it, so nothing fires after the match ends.

use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::handle::{MatchHandle, Request};
use super::ports::Ports;
use crate::core::{EngineError, EngineResult};
use crate::events::MatchEvent;
use crate::scheduler::{MatchReport, TimerSlot, TurnScheduler};

/// Queued player requests before senders wait.
const REQUEST_CAPACITY: usize = 32;

/// Events buffered per subscriber before it lags.
const EVENT_CAPACITY: usize = 1024;

/// A match running on the tokio runtime.
#[derive(Debug)]
pub struct RunningMatch {
    /// Player-side handle.
    pub handle: MatchHandle,
    /// Subscription that sees every event from the first one.
    pub events: broadcast::Receiver<MatchEvent>,
    /// Resolves with the report once the match ends.
    pub task: JoinHandle<EngineResult<MatchReport>>,
}

/// Spawn a match actor. Must be called inside a tokio runtime.
///
/// The match is abandoned (as a quit) once every `MatchHandle` clone has
/// been dropped.
pub fn spawn_match(scheduler: TurnScheduler, mut ports: Ports) -> RunningMatch {
    let (request_tx, request_rx) = mpsc::channel(REQUEST_CAPACITY);
    let (event_tx, event_rx) = broadcast::channel(EVENT_CAPACITY);
    ports.resolve_timeout(scheduler.config().pacing.commentary_timeout());

    let actor = MatchActor {
        scheduler,
        requests: request_rx,
        events: event_tx.clone(),
        ports,
        deadlines: FxHashMap::default(),
    };
    let task = tokio::spawn(actor.run());

    RunningMatch {
        handle: MatchHandle::new(request_tx, event_tx),
        events: event_rx,
        task,
    }
}

#[derive(Clone, Copy, Debug)]
struct Deadline {
    ticket: u64,
    at: Instant,
}

struct MatchActor {
    scheduler: TurnScheduler,
    requests: mpsc::Receiver<Request>,
    events: broadcast::Sender<MatchEvent>,
    ports: Ports,
    deadlines: FxHashMap<TimerSlot, Deadline>,
}

impl MatchActor {
    async fn run(mut self) -> EngineResult<MatchReport> {
        let second = Duration::from_secs(1);
        let mut clock = time::interval_at(Instant::now() + second, second);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            seconds = self.scheduler.state().remaining_seconds,
            "match started"
        );
        self.sync_timers();
        self.flush();

        while !self.scheduler.is_finished() {
            let step = self.deadlines.get(&TimerSlot::Step).copied();
            let safety = self.deadlines.get(&TimerSlot::Safety).copied();
            let decision = self.deadlines.get(&TimerSlot::Decision).copied();

            tokio::select! {
                biased;

                request = self.requests.recv() => match request {
                    Some(request) => self.handle(request),
                    None => {
                        info!("all match handles dropped, abandoning match");
                        if let Err(err) = self.scheduler.quit() {
                            debug!(error = %err, "abandon ignored");
                        }
                    }
                },
                _ = clock.tick() => self.scheduler.tick_clock(),
                _ = time::sleep_until(wake_at(safety)), if safety.is_some() => {
                    self.fire(TimerSlot::Safety, safety);
                }
                _ = time::sleep_until(wake_at(decision)), if decision.is_some() => {
                    self.fire(TimerSlot::Decision, decision);
                }
                _ = time::sleep_until(wake_at(step)), if step.is_some() => {
                    self.fire(TimerSlot::Step, step);
                }
            }

            self.sync_timers();
            self.flush();
        }

        let report = self.scheduler.report().ok_or(EngineError::MatchClosed)?;
        info!(result = ?report.result, reason = %report.reason, turns = report.turns, "match over");
        Ok(report)
    }

    fn handle(&mut self, request: Request) {
        // A dropped reply receiver only means the caller stopped waiting.
        match request {
            Request::Roll(reply) => {
                let _ = reply.send(self.scheduler.roll_dice());
            }
            Request::Answer(index, reply) => {
                let _ = reply.send(self.scheduler.answer_quiz(index));
            }
            Request::Claim(accept, reply) => {
                let _ = reply.send(self.scheduler.respond_to_claim(accept));
            }
            Request::Quit(reply) => {
                let _ = reply.send(self.scheduler.quit());
            }
            Request::Snapshot(reply) => {
                let _ = reply.send(self.scheduler.snapshot());
            }
        }
    }

    fn fire(&mut self, slot: TimerSlot, deadline: Option<Deadline>) {
        let Some(deadline) = deadline else {
            return;
        };
        self.deadlines.remove(&slot);
        if let Err(err) = self.scheduler.on_timer(slot, deadline.ticket) {
            error!(error = %err, ?slot, "timer callback failed");
        }
    }

    /// Mirror the scheduler's armed timers as wall-clock deadlines.
    fn sync_timers(&mut self) {
        for slot in TimerSlot::ALL {
            match self.scheduler.timer(slot) {
                Some(timer) => {
                    let fresh = self
                        .deadlines
                        .get(&slot)
                        .map_or(true, |d| d.ticket != timer.ticket);
                    if fresh {
                        self.deadlines.insert(
                            slot,
                            Deadline {
                                ticket: timer.ticket,
                                at: Instant::now() + timer.after,
                            },
                        );
                    }
                }
                None => {
                    self.deadlines.remove(&slot);
                }
            }
        }
    }

    fn flush(&mut self) {
        for event in self.scheduler.drain_events() {
            if let Some(description) = event.narration() {
                self.ports.narrate(description);
            }
            if let MatchEvent::ExperienceAward { amount } = event {
                self.ports.award(amount);
            }
            // No subscribers is fine; events are informational.
            let _ = self.events.send(event);
        }
    }
}

fn wake_at(deadline: Option<Deadline>) -> Instant {
    deadline.map_or_else(Instant::now, |d| d.at)
}
