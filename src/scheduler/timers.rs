//! Timer bookkeeping for the turn scheduler.
//!
//! The scheduler never sleeps. It arms timers by slot with a delay and a
//! fresh ticket; whoever drives it (the async runtime, or a test) waits
//! and calls back with the slot and ticket. A callback whose ticket no
//! longer matches the armed one is stale and ignored, so re-arming or
//! disarming a slot cancels any callback already in flight.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Independent timer slots. Each slot holds at most one armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerSlot {
    /// Next step of the turn pipeline (think, dice tick, land, end turn).
    Step,
    /// Bound on an opponent turn.
    Safety,
    /// Bound on a pending player decision.
    Decision,
}

impl TimerSlot {
    /// All slots.
    pub const ALL: [TimerSlot; 3] = [TimerSlot::Step, TimerSlot::Safety, TimerSlot::Decision];

    const fn index(self) -> usize {
        match self {
            TimerSlot::Step => 0,
            TimerSlot::Safety => 1,
            TimerSlot::Decision => 2,
        }
    }
}

/// An armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Slot the timer occupies.
    pub slot: TimerSlot,
    /// Identifies this arming; stale callbacks carry an older ticket.
    pub ticket: u64,
    /// Delay from the moment of arming.
    pub after: Duration,
}

/// One optional timer per slot plus a monotonically increasing ticket.
#[derive(Clone, Debug, Default)]
pub struct TimerSet {
    slots: [Option<Timer>; 3],
    next_ticket: u64,
}

impl TimerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot`, replacing any timer already there. Returns the ticket.
    pub fn arm(&mut self, slot: TimerSlot, after: Duration) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.slots[slot.index()] = Some(Timer {
            slot,
            ticket,
            after,
        });
        ticket
    }

    /// Disarm `slot`.
    pub fn disarm(&mut self, slot: TimerSlot) -> Option<Timer> {
        self.slots[slot.index()].take()
    }

    /// The timer armed in `slot`.
    #[must_use]
    pub fn get(&self, slot: TimerSlot) -> Option<Timer> {
        self.slots[slot.index()]
    }

    /// Whether `ticket` is the one currently armed in `slot`.
    #[must_use]
    pub fn is_current(&self, slot: TimerSlot, ticket: u64) -> bool {
        self.get(slot).is_some_and(|t| t.ticket == ticket)
    }

    /// Iterate over armed timers.
    pub fn armed(&self) -> impl Iterator<Item = Timer> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Disarm every slot.
    pub fn clear(&mut self) {
        self.slots = [None; 3];
    }
}
