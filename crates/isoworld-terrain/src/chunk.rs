//! Chunk addressing and the streaming chunk coordinator.

mod coordinator;

use serde::{Deserialize, Serialize};

pub use coordinator::{ChunkCoordinator, ChunkCoordinatorConfig};

/// Address of a `chunk_size × chunk_size` square of tiles, in chunk units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoordinate {
    pub x: i64,
    pub y: i64,
}

impl ChunkCoordinate {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Generation progress of one chunk. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

/// Chunk containing tile `(tile_x, tile_y)`, using floor division so that
/// negative tiles map to negative chunks (tile -1 is in chunk -1).
pub fn tile_to_chunk(tile_x: i64, tile_y: i64, chunk_size: usize) -> ChunkCoordinate {
    let size = chunk_size.max(1) as i64;
    ChunkCoordinate::new(tile_x.div_euclid(size), tile_y.div_euclid(size))
}

/// Tile coordinates of a chunk's top-left corner.
pub fn chunk_to_tile(coord: ChunkCoordinate, chunk_size: usize) -> (i64, i64) {
    let size = chunk_size.max(1) as i64;
    (coord.x * size, coord.y * size)
}
