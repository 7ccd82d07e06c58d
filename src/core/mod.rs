//! Core engine types: agents, randomness, configuration, commands, state, errors.
//!
//! These are the leaves every other module builds on.

pub mod side;
pub mod rng;
pub mod config;
pub mod command;
pub mod state;
pub mod error;

pub use side::{Side, SideMap};
pub use rng::{GameRng, GameRngState, RandomSource, ScriptedRng, DIE_FACES};
pub use config::{ChanceCard, ConfigError, EffectTuning, MatchConfig, Pacing};
pub use command::{Command, CommandRecord};
pub use state::{Agent, FinishReason, MatchResult, MatchState, Phase};
pub use error::{EngineError, EngineResult, Rejection};
