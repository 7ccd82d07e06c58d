//! Outbound match events.
//!
//! Events describe everything that happens during a match. They are
//! consumed by UI and analytics collaborators and never flow back into
//! the engine.

use serde::{Deserialize, Serialize};

use crate::board::TileKind;
use crate::core::{FinishReason, MatchResult, Side, SideMap};
use crate::effects::{Claim, Question};

/// Why a claim offer did not result in ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    /// The player said no.
    Refused,
    /// The player accepted but could not pay.
    InsufficientHp { needed: i32, available: i32 },
    /// The decision window expired.
    Expired,
}

/// A thing that happened during a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// The turn was handed to `active`.
    TurnChanged { active: Side, turn: u32 },

    /// `side` sat out a turn; `remaining` rest turns are left.
    Resting { side: Side, remaining: u32 },

    /// The opponent started its turn and is thinking.
    OpponentThinking { turn: u32 },

    /// One frame of the dice animation.
    DiceTumble { side: Side, tick: u32, of: u32 },

    /// The die settled and the mover set off.
    DiceRolled {
        side: Side,
        value: u8,
        from: usize,
        to: usize,
    },

    /// The mover arrived on a tile.
    TileLanded {
        side: Side,
        tile: usize,
        kind: TileKind,
        label: String,
    },

    /// The mover wrapped past the start tile.
    FullLapBonus { side: Side, applied: i32 },

    /// An effect outcome was applied.
    EffectApplied {
        side: Side,
        applied: SideMap<i32>,
        claim: Option<Claim>,
        rest_turns: u32,
        description: String,
    },

    /// The player may claim an unowned habit.
    ClaimOffered { tile: usize, cost: i32 },

    /// A claim offer ended without a claim.
    ClaimDeclined { tile: usize, reason: DeclineReason },

    /// The player must answer a question.
    QuizAsked { question: Question },

    /// A pending quiz went unanswered past the decision bound.
    QuizExpired,

    /// The opponent turn exceeded the safety bound and was passed.
    StallRecovered { turn: u32 },

    /// One second elapsed on the match clock.
    ClockTick { remaining_seconds: u32 },

    /// The match ended.
    MatchFinished {
        result: MatchResult,
        reason: FinishReason,
    },

    /// Request for the avatar ledger to award experience to the player.
    ExperienceAward { amount: u32 },
}

impl MatchEvent {
    /// Log line for this event, if it is worth showing.
    #[must_use]
    pub fn log_line(&self) -> Option<String> {
        match self {
            MatchEvent::TurnChanged { active, turn } => {
                Some(format!("Turn {}: {} to move", turn, active))
            }
            MatchEvent::Resting { side, .. } => {
                Some(format!("{} is resting and skips this turn", side))
            }
            MatchEvent::DiceRolled { side, value, .. } => {
                Some(format!("{} rolled a {}", side, value))
            }
            MatchEvent::FullLapBonus { side, applied } => {
                Some(format!("{} completed a lap (+{} HP)", side, applied))
            }
            MatchEvent::EffectApplied { description, .. } => Some(description.clone()),
            MatchEvent::ClaimDeclined { tile, reason } => Some(match reason {
                DeclineReason::Refused => format!("Skipped habit on tile {}", tile),
                DeclineReason::InsufficientHp { needed, .. } => {
                    format!("Not enough HP for tile {} (needs {})", tile, needed)
                }
                DeclineReason::Expired => format!("Claim offer on tile {} expired", tile),
            }),
            MatchEvent::QuizExpired => Some("The quiz went unanswered".to_string()),
            MatchEvent::StallRecovered { turn } => {
                Some(format!("Opponent turn {} timed out and was passed", turn))
            }
            MatchEvent::MatchFinished { result, reason } => Some(match result {
                MatchResult::Winner(side) => format!("{} wins: {}", side, reason),
                MatchResult::Draw => format!("Draw: {}", reason),
            }),
            MatchEvent::OpponentThinking { .. }
            | MatchEvent::DiceTumble { .. }
            | MatchEvent::TileLanded { .. }
            | MatchEvent::ClaimOffered { .. }
            | MatchEvent::QuizAsked { .. }
            | MatchEvent::ClockTick { .. }
            | MatchEvent::ExperienceAward { .. } => None,
        }
    }

    /// Description handed to the commentary port, if any.
    #[must_use]
    pub fn narration(&self) -> Option<String> {
        match self {
            MatchEvent::TileLanded {
                side, label, kind, ..
            } => Some(format!("{} landed on {} ({})", side, label, kind)),
            MatchEvent::EffectApplied { description, .. } => Some(description.clone()),
            MatchEvent::MatchFinished { .. } => self.log_line(),
            _ => None,
        }
    }

    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchEvent::MatchFinished { .. })
    }
}
