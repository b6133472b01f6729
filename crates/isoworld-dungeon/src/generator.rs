//! Room placement and corridor carving.

use isoworld_grid::{BiomeId, Grid, Tile, TileType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::{DungeonConfig, SHORTEST_CORRIDOR, SMALLEST_ROOM};
use crate::room::{Room, RoomPalette};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DungeonError {
    #[error("cannot generate a dungeon on an empty {width}x{height} grid")]
    EmptyGrid { width: usize, height: usize },
}

/// Rooms placed by one [`DungeonGenerator::generate_map`] call, plus the room
/// index pairs joined by corridors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DungeonLayout {
    /// Rooms in placement order; index 0 is the central room.
    pub rooms: Vec<Room>,
    /// Room index pairs joined by a corridor.
    pub corridors: Vec<(usize, usize)>,
}

impl DungeonLayout {
    /// `true` when the corridor graph links every room.
    pub fn is_connected(&self) -> bool {
        if self.rooms.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.rooms.len()];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(room) = stack.pop() {
            for &(a, b) in &self.corridors {
                let next = if a == room {
                    b
                } else if b == room {
                    a
                } else {
                    continue;
                };
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Carves rooms joined by L-shaped corridors into a grid.
///
/// The generator owns a seeded [`ChaCha8Rng`] that is rewound at the start of
/// every [`generate_map`](Self::generate_map) call, so the same seed, config,
/// grid size and biome always give the same layout.
pub struct DungeonGenerator {
    config: DungeonConfig,
    seed: u64,
    rng: ChaCha8Rng,
}

impl DungeonGenerator {
    pub fn new(config: DungeonConfig, seed: u64) -> Self {
        Self {
            config: config.sanitized(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Clears `grid` and stamps a dungeon themed for `biome` into it.
    ///
    /// Maps too small for the configured minimum still succeed with fewer
    /// rooms. Only a zero-sized grid is an error.
    pub fn generate_map(
        &mut self,
        grid: &mut Grid,
        biome: BiomeId,
    ) -> Result<DungeonLayout, DungeonError> {
        if grid.is_empty() {
            return Err(DungeonError::EmptyGrid {
                width: grid.width(),
                height: grid.height(),
            });
        }
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        let _span = tracing::debug_span!("dungeon", seed = self.seed, biome = biome.0).entered();

        grid.fill(TileType::Empty);

        let palette = RoomPalette::for_biome(biome);
        let rooms = self.place_rooms(grid.width() as i64, grid.height() as i64, palette, biome);
        for room in &rooms {
            stamp_room(grid, room);
        }

        let mut corridors = Vec::new();
        for i in 1..rooms.len() {
            let j = self.rng.random_range(0..i);
            self.carve_corridor(grid, &rooms, j, i, palette, biome);
            corridors.push((j, i));
        }

        let extra = (rooms.len() / 3).min(3);
        for _ in 0..extra {
            let a = self.rng.random_range(0..rooms.len());
            let b = self.rng.random_range(0..rooms.len());
            if a != b {
                self.carve_corridor(grid, &rooms, a, b, palette, biome);
                corridors.push((a, b));
            }
        }

        tracing::debug!(rooms = rooms.len(), corridors = corridors.len(), "dungeon generated");
        Ok(DungeonLayout { rooms, corridors })
    }

    fn place_rooms(&mut self, width: i64, height: i64, palette: RoomPalette, biome: BiomeId) -> Vec<Room> {
        // One tile of margin on every side.
        let fit = (width - 2).min(height - 2);
        if fit < SMALLEST_ROOM as i64 {
            tracing::warn!(width, height, "map too small for any dungeon room");
            return Vec::new();
        }

        let target = self
            .rng
            .random_range(self.config.min_rooms..=self.config.max_rooms);
        let min_size = (self.config.min_room_size as i64).min(fit);
        let max_size = (self.config.max_room_size as i64).min(fit);

        let w = self.rng.random_range(min_size..=max_size);
        let h = self.rng.random_range(min_size..=max_size);
        let mut rooms = vec![make_room((width - w) / 2, (height - h) / 2, w, h, palette, biome)];

        self.attach_rooms(&mut rooms, target, width, height, min_size, max_size, palette, biome);

        if rooms.len() < self.config.min_rooms {
            let shrunk_min = (min_size - 2).max(SMALLEST_ROOM as i64);
            let shrunk_max = (max_size - 2).max(shrunk_min);
            tracing::warn!(
                placed = rooms.len(),
                wanted = self.config.min_rooms,
                "retrying room placement with smaller rooms"
            );
            self.attach_rooms(&mut rooms, target, width, height, shrunk_min, shrunk_max, palette, biome);
        }

        if rooms.len() < self.config.min_rooms {
            tracing::warn!(
                placed = rooms.len(),
                wanted = self.config.min_rooms,
                width,
                height,
                "map too small for the requested number of rooms"
            );
        }
        rooms
    }

    #[allow(clippy::too_many_arguments)]
    fn attach_rooms(
        &mut self,
        rooms: &mut Vec<Room>,
        target: usize,
        width: i64,
        height: i64,
        min_size: i64,
        max_size: i64,
        palette: RoomPalette,
        biome: BiomeId,
    ) {
        let max_corridor = self.config.max_corridor_length as i64;
        for _ in 0..target * 3 {
            if rooms.len() >= target {
                break;
            }
            let parent = &rooms[self.rng.random_range(0..rooms.len())];
            let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
            let gap = self.rng.random_range(SHORTEST_CORRIDOR as i64..=max_corridor);
            let w = self.rng.random_range(min_size..=max_size);
            let h = self.rng.random_range(min_size..=max_size);
            let (cx, cy) = parent.center();

            let (x, y) = match direction {
                Direction::North => (cx - w / 2, parent.y - gap - h),
                Direction::South => (cx - w / 2, parent.bottom() + 1 + gap),
                Direction::West => (parent.x - gap - w, cy - h / 2),
                Direction::East => (parent.right() + 1 + gap, cy - h / 2),
            };
            if x < 1 || y < 1 || x + w > width - 1 || y + h > height - 1 {
                continue;
            }

            let candidate = make_room(x, y, w, h, palette, biome);
            if rooms.iter().any(|r| r.intersects(&candidate, 1)) {
                continue;
            }
            rooms.push(candidate);
        }
    }

    fn carve_corridor(
        &mut self,
        grid: &mut Grid,
        rooms: &[Room],
        from: usize,
        to: usize,
        palette: RoomPalette,
        biome: BiomeId,
    ) {
        let (ax, ay) = rooms[from].center();
        let (bx, by) = rooms[to].center();

        let bend = if self.rng.random_bool(0.5) {
            for x in span(ax, bx) {
                carve_cell(grid, rooms, x, ay, Axis::Horizontal, palette, biome);
            }
            for y in span(ay, by) {
                carve_cell(grid, rooms, bx, y, Axis::Vertical, palette, biome);
            }
            (bx, ay)
        } else {
            for y in span(ay, by) {
                carve_cell(grid, rooms, ax, y, Axis::Vertical, palette, biome);
            }
            for x in span(ax, bx) {
                carve_cell(grid, rooms, x, by, Axis::Horizontal, palette, biome);
            }
            (ax, by)
        };

        for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
            wall_if_empty(grid, bend.0 + dx, bend.1 + dy, palette.wall, biome);
        }
    }
}

fn span(a: i64, b: i64) -> std::ops::RangeInclusive<i64> {
    a.min(b)..=a.max(b)
}

fn make_room(x: i64, y: i64, width: i64, height: i64, palette: RoomPalette, biome: BiomeId) -> Room {
    Room {
        x,
        y,
        width,
        height,
        floor: palette.floor,
        wall: palette.wall,
        biome,
    }
}

fn paint(grid: &mut Grid, x: i64, y: i64, kind: TileType, biome: BiomeId) {
    if let Some(tile) = grid.tile_mut(x, y) {
        *tile = Tile::new(kind);
        tile.biome = Some(biome);
    }
}

fn stamp_room(grid: &mut Grid, room: &Room) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            let kind = if room.contains_interior(x, y) {
                room.floor
            } else {
                room.wall
            };
            paint(grid, x, y, kind, room.biome);
        }
    }
}

fn wall_if_empty(grid: &mut Grid, x: i64, y: i64, wall: TileType, biome: BiomeId) {
    if grid.tile_type(x, y) == Some(TileType::Empty) {
        paint(grid, x, y, wall, biome);
    }
}

fn carve_cell(
    grid: &mut Grid,
    rooms: &[Room],
    x: i64,
    y: i64,
    axis: Axis,
    palette: RoomPalette,
    biome: BiomeId,
) {
    if !grid.is_valid_coordinate(x, y) {
        return;
    }
    match rooms.iter().find(|r| r.contains(x, y)) {
        Some(room) if room.contains_interior(x, y) => return,
        Some(room) => {
            let crossing = match axis {
                Axis::Horizontal => room.on_vertical_wall(x, y),
                Axis::Vertical => room.on_horizontal_wall(x, y),
            };
            let kind = if crossing { TileType::Door } else { room.floor };
            paint(grid, x, y, kind, room.biome);
            return;
        }
        None => paint(grid, x, y, palette.floor, biome),
    }

    let sides = match axis {
        Axis::Horizontal => [(x, y - 1), (x, y + 1)],
        Axis::Vertical => [(x - 1, y), (x + 1, y)],
    };
    for (sx, sy) in sides {
        wall_if_empty(grid, sx, sy, palette.wall, biome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_is_rejected() {
        let mut generator = DungeonGenerator::new(DungeonConfig::default(), 1);
        let mut grid = Grid::new(0, 10);
        assert_eq!(
            generator.generate_map(&mut grid, BiomeId::FOREST),
            Err(DungeonError::EmptyGrid { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let mut a = Grid::new(80, 60);
        let mut b = Grid::new(80, 60);
        let mut generator = DungeonGenerator::new(DungeonConfig::default(), 77);
        let first = generator.generate_map(&mut a, BiomeId::DESERT).unwrap();
        let second = generator.generate_map(&mut b, BiomeId::DESERT).unwrap();
        assert_eq!(first, second, "generator must rewind its rng per call");
        assert_eq!(a, b);
    }

    #[test]
    fn test_rooms_do_not_overlap_and_respect_margin() {
        let mut grid = Grid::new(100, 100);
        let layout = DungeonGenerator::new(DungeonConfig::default(), 3)
            .generate_map(&mut grid, BiomeId::TEMPERATE_PLAINS)
            .unwrap();
        for (i, a) in layout.rooms.iter().enumerate() {
            assert!(a.x >= 1 && a.y >= 1, "room {i} touches the map edge");
            assert!(a.right() <= 98 && a.bottom() <= 98, "room {i} touches the map edge");
            for b in &layout.rooms[i + 1..] {
                assert!(!a.intersects(b, 0), "rooms overlap: {a:?} {b:?}");
            }
        }
    }

    #[test]
    fn test_room_centers_are_floor_and_biome_tagged() {
        let mut grid = Grid::new(90, 90);
        let layout = DungeonGenerator::new(DungeonConfig::default(), 12)
            .generate_map(&mut grid, BiomeId::SWAMP)
            .unwrap();
        assert!(!layout.rooms.is_empty());
        for room in &layout.rooms {
            let (cx, cy) = room.center();
            let tile = grid.tile(cx, cy).unwrap();
            assert!(tile.kind().walkable(), "center of {room:?} is {:?}", tile.kind());
            assert_eq!(tile.biome, Some(BiomeId::SWAMP));
        }
    }

    #[test]
    fn test_doors_only_sit_on_room_walls() {
        let mut grid = Grid::new(120, 120);
        let layout = DungeonGenerator::new(DungeonConfig::default(), 8)
            .generate_map(&mut grid, BiomeId::TUNDRA)
            .unwrap();
        for (x, y, tile) in grid.iter() {
            if tile.kind() == TileType::Door {
                let (x, y) = (x as i64, y as i64);
                assert!(
                    layout
                        .rooms
                        .iter()
                        .any(|r| r.on_vertical_wall(x, y) || r.on_horizontal_wall(x, y)),
                    "door at ({x}, {y}) is not on a room wall"
                );
            }
        }
    }

    #[test]
    fn test_corridor_graph_is_connected() {
        let mut grid = Grid::new(120, 120);
        let layout = DungeonGenerator::new(DungeonConfig::default(), 21)
            .generate_map(&mut grid, BiomeId::HIGHLANDS)
            .unwrap();
        assert!(layout.is_connected());
        assert!(layout.corridors.len() >= layout.rooms.len().saturating_sub(1));
    }

    #[test]
    fn test_tiny_map_degrades_without_error() {
        let mut grid = Grid::new(4, 4);
        let layout = DungeonGenerator::new(DungeonConfig::default(), 5)
            .generate_map(&mut grid, BiomeId::FOREST)
            .unwrap();
        assert!(layout.rooms.is_empty());
        assert!(grid.tiles().iter().all(|t| t.kind() == TileType::Empty));
    }
}
