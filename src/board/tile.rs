//! Tile definitions.
//!
//! A tile's kind, label and cost are fixed for the life of the board.
//! Only `Habit` and `Gym` tiles carry a mutable owner.

use serde::{Deserialize, Serialize};

use crate::core::Side;

/// What happens when an agent lands on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Starting tile; no effect.
    Start,
    /// Claimable healthy habit.
    Habit,
    /// Multiple-choice health question.
    Quiz,
    /// Random outcome from the chance table.
    Chance,
    /// Flat HP penalty.
    Danger,
    /// Heal and rest for a turn.
    Hospital,
    /// Claimable exercise tile; behaves like `Habit`.
    Gym,
}

impl TileKind {
    /// Whether tiles of this kind can be owned.
    #[must_use]
    pub const fn is_claimable(self) -> bool {
        matches!(self, TileKind::Habit | TileKind::Gym)
    }
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileKind::Start => "start",
            TileKind::Habit => "habit",
            TileKind::Quiz => "quiz",
            TileKind::Chance => "chance",
            TileKind::Danger => "danger",
            TileKind::Hospital => "hospital",
            TileKind::Gym => "gym",
        };
        f.write_str(name)
    }
}

/// One cell of the cyclic board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the board (`0..len`).
    pub index: usize,
    /// Effect kind.
    pub kind: TileKind,
    /// Display name.
    pub label: String,
    /// Claim cost in HP (0 for unclaimable kinds).
    pub cost: i32,
    /// Current owner; always `None` for unclaimable kinds.
    pub owner: Option<Side>,
}

impl Tile {
    /// Create an unowned tile.
    pub fn new(index: usize, kind: TileKind, label: impl Into<String>, cost: i32) -> Self {
        Self {
            index,
            kind,
            label: label.into(),
            cost: cost.max(0),
            owner: None,
        }
    }

    /// Create an unclaimable tile with no cost.
    pub fn plain(index: usize, kind: TileKind, label: impl Into<String>) -> Self {
        Self::new(index, kind, label, 0)
    }

    /// Whether this tile can be owned.
    #[must_use]
    pub fn is_claimable(&self) -> bool {
        self.kind.is_claimable()
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claimable_kinds() {
        assert!(TileKind::Habit.is_claimable());
        assert!(TileKind::Gym.is_claimable());
        for kind in [
            TileKind::Start,
            TileKind::Quiz,
            TileKind::Chance,
            TileKind::Danger,
            TileKind::Hospital,
        ] {
            assert!(!kind.is_claimable(), "{} should not be claimable", kind);
        }
    }

    #[test]
    fn test_tile_new_clamps_cost() {
        let tile = Tile::new(3, TileKind::Habit, "Eat salad", -5);
        assert_eq!(tile.cost, 0);
        assert_eq!(tile.owner, None);
        assert_eq!(tile.to_string(), "Eat salad (habit)");
    }
}
