//! # health-board
//!
//! A two-agent, turn-based board game engine. A human player and an
//! autonomous opponent race around a ring of habit, quiz, chance, danger
//! and hospital tiles; health points are the only resource and the only
//! win condition.
//!
//! ## Design Principles
//!
//! 1. **Single Writer**: only the turn scheduler mutates match state.
//!    Effect resolution reads state and returns deltas; the scheduler
//!    applies them in one step.
//!
//! 2. **Time Is an Input**: the state machine never sleeps. Pacing
//!    delays, the opponent safety bound and the match clock arrive as
//!    ticketed timer callbacks, so tests drive a match deterministically
//!    and the async runtime drives it in real time.
//!
//! 3. **Injectable Randomness**: dice, opponent quiz answers and chance
//!    cards all go through `RandomSource`.
//!
//! ## Architecture
//!
//! - **Board**: fixed ring of tiles; movement wraps and counts laps.
//!
//! - **Effects**: per-tile policies producing `EffectOutcome` deltas or a
//!   request for a player decision.
//!
//! - **Scheduler**: turn phases, rest turns, the opponent pipeline with
//!   its in-flight guard, and termination.
//!
//! - **Runtime**: tokio actor supplying real time and fire-and-forget
//!   commentary and ledger ports.
//!
//! ## Modules
//!
//! - `core`: Sides, randomness, configuration, commands, state, errors
//! - `board`: Tiles and the cyclic board
//! - `effects`: Effect resolution and the question bank
//! - `events`: Outbound events and the display log
//! - `scheduler`: The turn state machine
//! - `runtime`: Async driver, match handle and ports

pub mod core;
pub mod board;
pub mod effects;
pub mod events;
pub mod scheduler;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::{
    Side, SideMap,
    GameRng, RandomSource, ScriptedRng,
    MatchConfig, EffectTuning, Pacing, ChanceCard,
    Command, MatchState, Phase, MatchResult, FinishReason,
    EngineError, EngineResult, Rejection,
};

pub use crate::board::{Board, Tile, TileKind};

pub use crate::effects::{EffectOutcome, EffectResolver, Question, QuestionBank, Resolution};

pub use crate::events::{EventLog, MatchEvent};

pub use crate::scheduler::{ClaimResult, MatchBuilder, MatchReport, MatchSnapshot, TurnScheduler};

pub use crate::runtime::{spawn_match, MatchHandle, Ports, RunningMatch};
