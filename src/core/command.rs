//! Inbound commands and their history records.
//!
//! Commands are validated against the current phase and active agent.
//! Invalid commands are rejected, never queued.

use serde::{Deserialize, Serialize};

use super::side::Side;

/// A command accepted by the engine.
///
/// The player issues every command explicitly; the opponent's rolls are
/// issued by the scheduler and recorded with the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Roll the die for the active agent.
    RollDice,
    /// Answer the pending quiz with the given option.
    AnswerQuiz(usize),
    /// Accept or decline the pending claim offer.
    RespondToClaim(bool),
    /// Abandon the match (forced player loss).
    Quit,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::RollDice => write!(f, "roll"),
            Command::AnswerQuiz(index) => write!(f, "answer {}", index),
            Command::RespondToClaim(accept) => {
                write!(f, "{} claim", if *accept { "accept" } else { "decline" })
            }
            Command::Quit => write!(f, "quit"),
        }
    }
}

/// An accepted command with metadata for history and replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// The agent the command acted for.
    pub side: Side,

    /// The command.
    pub command: Command,

    /// Turn number when the command was accepted.
    pub turn: u32,

    /// Sequence number within the turn.
    pub sequence: u32,
}

impl CommandRecord {
    /// Create a new command record.
    #[must_use]
    pub fn new(side: Side, command: Command, turn: u32, sequence: u32) -> Self {
        Self {
            side,
            command,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Command::RollDice.to_string(), "roll");
        assert_eq!(Command::AnswerQuiz(2).to_string(), "answer 2");
        assert_eq!(Command::RespondToClaim(true).to_string(), "accept claim");
        assert_eq!(Command::RespondToClaim(false).to_string(), "decline claim");
    }

    #[test]
    fn test_record_serialization() {
        let record = CommandRecord::new(Side::Player, Command::AnswerQuiz(1), 3, 0);
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: CommandRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
