//! Engine error taxonomy.
//!
//! - `InvalidCommand`: wrong phase or actor; rejected with no state change
//! - `InsufficientResource`: not enough HP to claim; surfaced as a declined claim
//! - `StallTimeout`: opponent turn exceeded its bound; recovered internally
//! - `ExternalNotifyFailure`: a port failed; logged and swallowed
//!
//! Only `Quit` ends a match early; nothing in this module is fatal.

use std::time::Duration;

use thiserror::Error;

use super::config::ConfigError;
use super::side::Side;
use super::state::Phase;
use crate::board::BoardError;
use crate::effects::QuizError;

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The match already ended.
    #[error("match is finished")]
    MatchFinished,

    /// The command belongs to the other agent's turn.
    #[error("it is the {active} turn")]
    NotYourTurn { active: Side },

    /// The state machine is not in the phase the command needs.
    #[error("expected phase {expected:?}, match is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    /// The agent is resting after a hospital visit.
    #[error("agent is resting for {turns} more turn(s)")]
    Resting { turns: u32 },

    /// No quiz is waiting for an answer.
    #[error("no quiz is pending")]
    NoPendingQuiz,

    /// No claim offer is waiting for a decision.
    #[error("no claim offer is pending")]
    NoPendingClaim,

    /// Quiz answer index past the last option.
    #[error("option {index} is out of range for {options} options")]
    OptionOutOfRange { index: usize, options: usize },
}

/// Errors surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Command rejected; state unchanged.
    #[error("invalid command: {0}")]
    InvalidCommand(#[from] Rejection),

    /// Not enough HP for a claim.
    #[error("insufficient HP: need {needed}, have {available}")]
    InsufficientResource { needed: i32, available: i32 },

    /// Opponent turn did not complete within its bound.
    #[error("opponent turn {turn} stalled for {after:?}")]
    StallTimeout { turn: u32, after: Duration },

    /// An external collaborator failed.
    #[error("external notify failed: {0}")]
    ExternalNotifyFailure(String),

    /// Board lookup or ownership failure.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid question bank.
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Checkpoint encoding or decoding failed.
    #[error("checkpoint codec error: {0}")]
    Codec(String),

    /// The match actor has shut down.
    #[error("match is closed")]
    MatchClosed,
}

impl EngineError {
    /// Whether this is a command rejection.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::InvalidCommand(_))
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_converts() {
        let err: EngineError = Rejection::MatchFinished.into();
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "invalid command: match is finished");
    }

    #[test]
    fn test_messages() {
        let err = EngineError::InsufficientResource {
            needed: 40,
            available: 10,
        };
        assert_eq!(err.to_string(), "insufficient HP: need 40, have 10");
        assert!(!err.is_rejection());

        let rejection = Rejection::NotYourTurn {
            active: Side::Opponent,
        };
        assert_eq!(rejection.to_string(), "it is the Opponent turn");
    }
}
