//! Dungeon generation limits.

use serde::{Deserialize, Serialize};

/// Room count and size limits for [`crate::DungeonGenerator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Fewest rooms to aim for before giving up on a small map.
    pub min_rooms: usize,
    /// Upper bound on the random room target.
    pub max_rooms: usize,
    /// Smallest room side, walls included.
    pub min_room_size: usize,
    /// Largest room side, walls included.
    pub max_room_size: usize,
    /// Longest gap between a room and the room it branches from.
    pub max_corridor_length: usize,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            min_rooms: 5,
            max_rooms: 12,
            min_room_size: 5,
            max_room_size: 12,
            max_corridor_length: 8,
        }
    }
}

/// A room needs a wall ring around at least one floor tile.
pub(crate) const SMALLEST_ROOM: usize = 3;
pub(crate) const SHORTEST_CORRIDOR: usize = 2;

impl DungeonConfig {
    /// Returns a copy with every limit made consistent: at least one room,
    /// rooms of at least 3×3, corridors of at least 2 and `min <= max`.
    pub fn sanitized(&self) -> Self {
        let min_rooms = self.min_rooms.max(1);
        let min_room_size = self.min_room_size.max(SMALLEST_ROOM);
        Self {
            min_rooms,
            max_rooms: self.max_rooms.max(min_rooms),
            min_room_size,
            max_room_size: self.max_room_size.max(min_room_size),
            max_corridor_length: self.max_corridor_length.max(SHORTEST_CORRIDOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_fixes_inverted_limits() {
        let config = DungeonConfig {
            min_rooms: 0,
            max_rooms: 0,
            min_room_size: 8,
            max_room_size: 2,
            max_corridor_length: 0,
        }
        .sanitized();
        assert_eq!(config.min_rooms, 1);
        assert_eq!(config.max_rooms, 1);
        assert_eq!(config.max_room_size, 8);
        assert_eq!(config.max_corridor_length, 2);
    }

    #[test]
    fn test_default_is_already_sane() {
        let config = DungeonConfig::default();
        assert_eq!(config.sanitized(), config);
    }
}
