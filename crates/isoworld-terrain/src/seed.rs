//! Deterministic seed mixing.
//!
//! Provides the splitmix64 finalizer used to decorrelate noise layers, hash
//! lattice cells for cellular noise, and derive per-chunk seeds from the planet
//! seed and chunk coordinate.

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkCoordinate;

/// splitmix64 finalizer: a bijective, well-distributed mix of a 64-bit value.
#[inline]
pub fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Combines a seed with a salt into a new, decorrelated seed.
#[inline]
pub fn mix_seed(seed: u64, salt: u64) -> u64 {
    splitmix64(seed ^ splitmix64(salt))
}

/// Hashes a 2D integer coordinate under `seed`. Order-sensitive:
/// `(x, y)` and `(y, x)` hash differently.
#[inline]
pub fn hash_coords(seed: u64, x: i64, y: i64) -> u64 {
    mix_seed(mix_seed(seed, x as u64), y as u64)
}

/// How a chunk's synthesis seed is derived from the planet seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkSeeding {
    /// Hash-combine of planet seed and both chunk coordinates.
    #[default]
    Mixed,
    /// `seed + x * 1000 + y` with wrapping arithmetic. Aliases for chunk
    /// coordinates beyond roughly ±1000 (e.g. `(1, 0)` and `(0, 1000)`);
    /// only kept to reproduce worlds saved by older builds.
    Legacy,
}

/// Derives the synthesis seed for one chunk.
pub fn derive_chunk_seed(planet_seed: u64, coord: ChunkCoordinate, seeding: ChunkSeeding) -> u64 {
    match seeding {
        ChunkSeeding::Mixed => hash_coords(planet_seed, coord.x, coord.y),
        ChunkSeeding::Legacy => {
            let offset = coord.x.wrapping_mul(1000).wrapping_add(coord.y);
            planet_seed.wrapping_add(offset as u64)
        }
    }
}
