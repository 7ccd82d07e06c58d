//! The cyclic board.
//!
//! A `Board` is created once per match and never resized. Movement wraps
//! modulo the board length; a move whose destination index is smaller
//! than its origin has passed the start tile (a full lap).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tile::{Tile, TileKind};
use crate::core::Side;

/// Board lookup and ownership errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Ownership change on a tile kind that cannot be owned.
    #[error("tile {index} is a {kind} tile and cannot be owned")]
    NotClaimable { index: usize, kind: TileKind },

    /// Index past the end of the board.
    #[error("tile {index} is out of range for a board of {len}")]
    OutOfRange { index: usize, len: usize },

    /// A board needs at least one tile.
    #[error("board has no tiles")]
    Empty,

    /// Tile stored at a position whose index field disagrees.
    #[error("tile at position {position} has index {index}")]
    IndexMismatch { position: usize, index: usize },
}

/// Result of moving along the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Starting tile.
    pub from: usize,
    /// Destination tile.
    pub to: usize,
    /// Whether the move wrapped past the start.
    pub wrapped: bool,
}

/// Fixed-size ordered ring of tiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Create a board from tiles in order.
    ///
    /// Each tile's `index` must equal its position; owners are reset.
    pub fn new(tiles: Vec<Tile>) -> Result<Self, BoardError> {
        if tiles.is_empty() {
            return Err(BoardError::Empty);
        }
        let mut tiles = tiles;
        for (position, tile) in tiles.iter_mut().enumerate() {
            if tile.index != position {
                return Err(BoardError::IndexMismatch {
                    position,
                    index: tile.index,
                });
            }
            tile.owner = None;
        }
        Ok(Self { tiles })
    }

    /// The standard 28-tile health board.
    #[must_use]
    pub fn standard() -> Self {
        use TileKind::*;

        const LAYOUT: [(TileKind, &str, i32); 28] = [
            (Start, "Start", 0),
            (Habit, "Wash hands", 30),
            (Quiz, "Pop quiz", 0),
            (Habit, "Eat salad", 40),
            (Chance, "Chance", 0),
            (Habit, "Brush teeth", 50),
            (Danger, "Candy binge", 0),
            (Habit, "Drink water", 60),
            (Gym, "Jogging", 70),
            (Quiz, "Pop quiz", 0),
            (Hospital, "Recovery", 0),
            (Habit, "Swimming", 80),
            (Chance, "Chance", 0),
            (Habit, "Reading", 90),
            (Habit, "Fresh fruit", 100),
            (Gym, "Yoga", 110),
            (Danger, "Staying up late", 0),
            (Habit, "Sweep the house", 120),
            (Quiz, "Pop quiz", 0),
            (Habit, "Drink milk", 130),
            (Danger, "Soda", 0),
            (Habit, "Hiking", 140),
            (Chance, "Chance", 0),
            (Habit, "Play sports", 150),
            (Habit, "Take a shower", 160),
            (Quiz, "Pop quiz", 0),
            (Danger, "Screen staring", 0),
            (Habit, "Meditation", 170),
        ];

        let tiles = LAYOUT
            .iter()
            .enumerate()
            .map(|(index, &(kind, label, cost))| Tile::new(index, kind, label, cost))
            .collect();
        Self { tiles }
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; boards are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile at an index.
    pub fn tile_at(&self, index: usize) -> Result<&Tile, BoardError> {
        self.tiles.get(index).ok_or(BoardError::OutOfRange {
            index,
            len: self.tiles.len(),
        })
    }

    /// Iterate over tiles in order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Move `steps` tiles forward from `from`, wrapping around.
    #[must_use]
    pub fn advance(&self, from: usize, steps: usize) -> Step {
        let len = self.tiles.len();
        let start = from % len;
        let to = (start + steps) % len;
        Step {
            from: start,
            to,
            wrapped: to < start,
        }
    }

    /// Change a tile's owner. Fails unless the tile is a Habit or Gym.
    pub fn set_owner(&mut self, index: usize, owner: Option<Side>) -> Result<(), BoardError> {
        let len = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(BoardError::OutOfRange { index, len })?;
        if !tile.is_claimable() {
            return Err(BoardError::NotClaimable {
                index,
                kind: tile.kind,
            });
        }
        tile.owner = owner;
        Ok(())
    }

    /// Indices of tiles owned by `side`.
    pub fn owned_by(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        self.tiles
            .iter()
            .filter(move |t| t.owner == Some(side))
            .map(|t| t.index)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
