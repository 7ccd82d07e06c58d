//! Match state: both agents, the turn phase and the match clock.
//!
//! ## Invariants
//!
//! - `0 <= hp <= max_hp` for both agents after every mutation
//! - `phase == Phase::Finished` exactly when `finished` is set
//! - once finished, nothing mutates the state again
//!
//! The state is mutated only by the turn scheduler, which applies effect
//! outcomes atomically. Everything else reads clones.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::command::CommandRecord;
use super::error::{EngineError, EngineResult};
use super::side::{Side, SideMap};

/// One agent's position and resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Tile index.
    pub position: usize,
    /// Health points, the sole win-condition metric.
    pub hp: i32,
    /// Turns this agent will sit out.
    pub skip_turns: u32,
}

impl Agent {
    /// Create an agent on the start tile.
    #[must_use]
    pub fn new(hp: i32) -> Self {
        Self {
            position: 0,
            hp,
            skip_turns: 0,
        }
    }

    /// Add `delta` HP, clamped to `[0, max_hp]`. Returns the change applied.
    pub fn adjust_hp(&mut self, delta: i32, max_hp: i32) -> i32 {
        let before = self.hp;
        self.hp = before.saturating_add(delta).clamp(0, max_hp);
        self.hp - before
    }

    /// Whether the agent has run out of HP.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }
}

/// Turn state machine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the active agent to roll.
    AwaitingRoll,
    /// Die rolled; the mover is travelling to its destination.
    Moving,
    /// The landing tile's effect is being resolved.
    ResolvingEffect,
    /// Suspended on a player decision (quiz answer or claim offer).
    AwaitingAnswer,
    /// Effect applied; waiting to hand the turn over.
    TurnTransition,
    /// Absorbing terminal phase.
    Finished,
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// One agent won.
    Winner(Side),
    /// Equal HP.
    Draw,
}

impl MatchResult {
    /// The agent with strictly greater HP wins, otherwise a draw.
    #[must_use]
    pub fn from_hp(player_hp: i32, opponent_hp: i32) -> Self {
        match player_hp.cmp(&opponent_hp) {
            std::cmp::Ordering::Greater => MatchResult::Winner(Side::Player),
            std::cmp::Ordering::Less => MatchResult::Winner(Side::Opponent),
            std::cmp::Ordering::Equal => MatchResult::Draw,
        }
    }

    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: Side) -> bool {
        matches!(self, MatchResult::Winner(s) if *s == side)
    }
}

/// Why a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// The given agent reached 0 HP.
    HpDepleted(Side),
    /// The match clock ran out.
    TimeUp,
    /// The player abandoned the match.
    Quit,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::HpDepleted(side) => write!(f, "{} ran out of HP", side),
            FinishReason::TimeUp => write!(f, "time is up"),
            FinishReason::Quit => write!(f, "player quit"),
        }
    }
}

/// Complete match state.
///
/// Cloning is cheap: the command history is an `im::Vector`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Both agents.
    pub agents: SideMap<Agent>,

    /// Whose turn it is.
    pub active: Side,

    /// State machine phase.
    pub phase: Phase,

    /// Seconds left on the match clock.
    pub remaining_seconds: u32,

    /// Set once, together with `Phase::Finished`.
    pub finished: bool,

    /// Result, present once finished.
    pub result: Option<MatchResult>,

    /// Why the match ended, present once finished.
    pub finish_reason: Option<FinishReason>,

    /// Turn number (starts at 1, incremented on every hand-over).
    pub turn_number: u32,

    /// Command sequence within the current turn.
    pub sequence: u32,

    /// Most recent die value.
    pub last_roll: Option<u8>,

    /// Accepted commands.
    pub history: Vector<CommandRecord>,
}

impl MatchState {
    /// Create the initial state: both agents on tile 0, player to roll.
    #[must_use]
    pub fn new(starting_hp: i32, match_seconds: u32) -> Self {
        Self {
            agents: SideMap::with_value(Agent::new(starting_hp)),
            active: Side::Player,
            phase: Phase::AwaitingRoll,
            remaining_seconds: match_seconds,
            finished: false,
            result: None,
            finish_reason: None,
            turn_number: 1,
            sequence: 0,
            last_roll: None,
            history: Vector::new(),
        }
    }

    /// Set an agent's HP (scenario setup), clamped to `[0, max_hp]`.
    #[must_use]
    pub fn with_hp(mut self, side: Side, hp: i32, max_hp: i32) -> Self {
        self.agents[side].hp = hp.clamp(0, max_hp);
        self
    }

    /// Set an agent's position (scenario setup).
    #[must_use]
    pub fn with_position(mut self, side: Side, position: usize) -> Self {
        self.agents[side].position = position;
        self
    }

    /// Set an agent's pending rest turns (scenario setup).
    #[must_use]
    pub fn with_skip_turns(mut self, side: Side, turns: u32) -> Self {
        self.agents[side].skip_turns = turns;
        self
    }

    /// Get an agent.
    #[must_use]
    pub fn agent(&self, side: Side) -> &Agent {
        &self.agents[side]
    }

    /// HP of an agent.
    #[must_use]
    pub fn hp(&self, side: Side) -> i32 {
        self.agents[side].hp
    }

    /// Whether the active agent is `side` and the phase is `phase`.
    #[must_use]
    pub fn is_at(&self, side: Side, phase: Phase) -> bool {
        !self.finished && self.active == side && self.phase == phase
    }

    /// First agent found with no HP left, player first.
    #[must_use]
    pub fn depleted_side(&self) -> Option<Side> {
        self.agents
            .iter()
            .find(|(_, agent)| agent.is_depleted())
            .map(|(side, _)| side)
    }

    /// Record an accepted command and advance the sequence.
    pub fn record(&mut self, side: Side, command: super::command::Command) {
        let record = CommandRecord::new(side, command, self.turn_number, self.sequence);
        self.sequence += 1;
        self.history.push_back(record);
    }

    /// Hand the turn to `side`.
    pub fn begin_turn(&mut self, side: Side) {
        self.active = side;
        self.phase = Phase::AwaitingRoll;
        self.turn_number += 1;
        self.sequence = 0;
    }

    /// Enter the absorbing finished phase.
    pub fn finish(&mut self, reason: FinishReason, result: MatchResult) {
        self.phase = Phase::Finished;
        self.finished = true;
        self.finish_reason = Some(reason);
        self.result = Some(result);
    }

    /// Encode a checkpoint.
    pub fn encode(&self) -> EngineResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::Codec(e.to_string()))
    }

    /// Decode a checkpoint.
    pub fn decode(bytes: &[u8]) -> EngineResult<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Codec(e.to_string()))
    }
}
