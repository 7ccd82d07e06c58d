//! Pipeline bookkeeping: what the step timer does next, the move in
//! flight, pending player decisions and the opponent-turn token.

use serde::{Deserialize, Serialize};

use crate::board::Step;
use crate::core::Side;
use crate::effects::Question;

/// Action performed when the step timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    /// Opponent finished thinking; start the dice animation.
    OpponentThink,
    /// One dice animation frame for the opponent.
    RollTick { tick: u32 },
    /// The mover arrives on its destination tile.
    Land,
    /// Hand the turn over.
    EndTurn,
}

/// A rolled move not yet committed to state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    /// Who is moving.
    pub side: Side,
    /// Die value.
    pub roll: u8,
    /// Origin, destination and wrap flag.
    pub step: Step,
}

/// A player decision the state machine is suspended on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingDecision {
    /// Claim the unowned habit on `tile` for `cost` HP?
    Claim { tile: usize, cost: i32 },
    /// Answer this question.
    Quiz(Question),
}

/// Exclusive token for the single opponent turn in flight.
///
/// Holding `Some(OpponentTurn)` is the lock; a second start request while
/// it is held is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentTurn {
    /// Turn number the pipeline belongs to.
    pub turn: u32,
    /// Ticket of the safety timer guarding it.
    pub safety_ticket: u64,
}
