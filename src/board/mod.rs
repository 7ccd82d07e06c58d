//! Board model: an immutable ring of tiles with mutable habit ownership.

mod layout;
mod tile;

pub use layout::{Board, BoardError, Step};
pub use tile::{Tile, TileKind};
