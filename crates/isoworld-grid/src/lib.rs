//! Tile grid data model shared by every generator: tile types, per-tile environmental
//! data, the bounds-checked [`Grid`] container, and the persisted tile-map format.

mod grid;
mod serial;
mod tile;

pub use grid::{Grid, SharedGrid};
pub use serial::TileMapError;
pub use tile::{BiomeId, Color, Decoration, Tile, TileType};
