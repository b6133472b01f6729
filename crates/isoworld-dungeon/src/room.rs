//! Room rectangles and per-biome tile palettes.

use isoworld_grid::{BiomeId, TileType};

/// Floor and wall tile types used for a dungeon in a given biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomPalette {
    /// Walkable interior and corridor tile.
    pub floor: TileType,
    /// Blocking tile for room rings and corridor sides.
    pub wall: TileType,
}

impl RoomPalette {
    pub fn for_biome(biome: BiomeId) -> Self {
        let (floor, wall) = match biome {
            BiomeId::FOREST => (TileType::Dirt, TileType::Wall),
            BiomeId::DESERT => (TileType::Sand, TileType::RockFormation),
            BiomeId::TUNDRA => (TileType::Snow, TileType::Wall),
            BiomeId::GLACIER => (TileType::Ice, TileType::Wall),
            BiomeId::SWAMP => (TileType::Mud, TileType::Wall),
            BiomeId::HIGHLANDS => (TileType::Stone, TileType::Mountain),
            BiomeId::VOLCANIC_WASTES => (TileType::Stone, TileType::RockFormation),
            BiomeId::CRYSTAL_FIELDS => (TileType::Floor, TileType::Crystal),
            BiomeId::ALIEN_JUNGLE => (TileType::AlienGrowth, TileType::RockFormation),
            _ => (TileType::Floor, TileType::Wall),
        };
        Self { floor, wall }
    }
}

/// An axis-aligned room, walls included in its bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    /// Left column of the wall ring.
    pub x: i64,
    /// Top row of the wall ring.
    pub y: i64,
    /// Width in tiles, walls included.
    pub width: i64,
    /// Height in tiles, walls included.
    pub height: i64,
    /// Interior tile type.
    pub floor: TileType,
    /// Wall ring tile type.
    pub wall: TileType,
    /// Biome stamped onto every tile of the room.
    pub biome: BiomeId,
}

impl Room {
    pub fn center(&self) -> (i64, i64) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn right(&self) -> i64 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height - 1
    }

    /// `true` if the rectangles, each grown by `padding`, overlap.
    pub fn intersects(&self, other: &Room, padding: i64) -> bool {
        self.x - padding <= other.right()
            && other.x <= self.right() + padding
            && self.y - padding <= other.bottom()
            && other.y <= self.bottom() + padding
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.x..=self.right()).contains(&x) && (self.y..=self.bottom()).contains(&y)
    }

    /// Inside the wall ring.
    pub fn contains_interior(&self, x: i64, y: i64) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.bottom()
    }

    /// On the left or right wall, corners excluded.
    pub fn on_vertical_wall(&self, x: i64, y: i64) -> bool {
        (x == self.x || x == self.right()) && y > self.y && y < self.bottom()
    }

    /// On the top or bottom wall, corners excluded.
    pub fn on_horizontal_wall(&self, x: i64, y: i64) -> bool {
        (y == self.y || y == self.bottom()) && x > self.x && x < self.right()
    }
}
