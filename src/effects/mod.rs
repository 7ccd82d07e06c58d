//! Effect system for tile landings.
//!
//! - `EffectResolver`: maps (mover, tile, state) to an outcome or a
//!   request for a player decision
//! - `EffectOutcome`: HP deltas, ownership change and rest grant, applied
//!   atomically by the scheduler
//! - `QuestionBank`: quiz questions drawn on Quiz tiles
//!
//! ## Design Philosophy
//!
//! Resolution is pure. Every random draw goes through the injected
//! `RandomSource`, so the same script always produces the same outcome.

mod outcome;
mod quiz;
mod resolver;

pub use outcome::{transfer_amount, Claim, EffectOutcome};
pub use quiz::{Question, QuestionBank, QuizError};
pub use resolver::{EffectResolver, Resolution};
