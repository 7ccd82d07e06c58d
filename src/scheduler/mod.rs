//! Turn scheduling.
//!
//! The scheduler owns the match state and moves it through the turn
//! phases, runs the autonomous opponent and enforces the safety bound on
//! opponent turns. Time is externalised as ticketed timers so the state
//! machine itself stays synchronous and deterministic.
//!
//! ## Usage
//!
//! ```
//! use health_board::core::{MatchConfig, Pacing, ScriptedRng, Side};
//! use health_board::scheduler::MatchBuilder;
//!
//! let mut scheduler = MatchBuilder::new()
//!     .config(MatchConfig::new().with_pacing(Pacing::instant()))
//!     .rng(ScriptedRng::new(7).with_dice([4]))
//!     .build()
//!     .unwrap();
//!
//! scheduler.roll_dice().unwrap();
//! scheduler.settle().unwrap();
//! assert_eq!(scheduler.state().agent(Side::Player).position, 4);
//! ```

mod builder;
mod pipeline;
mod timers;
mod turn;

pub use builder::MatchBuilder;
pub use pipeline::{OpponentTurn, PendingDecision, PendingMove, StepAction};
pub use timers::{Timer, TimerSet, TimerSlot};
pub use turn::{ClaimResult, MatchReport, MatchSnapshot, TurnScheduler};
