//! Dense row-major tile grid with bounds-checked accessors.

use std::sync::{Arc, RwLock};

use crate::tile::{Tile, TileType};

/// A caller-owned grid shared with background chunk workers.
///
/// Each worker takes the write lock only for the short merge of a finished
/// chunk, so readers are blocked for at most one chunk copy.
pub type SharedGrid = Arc<RwLock<Grid>>;

/// Dense 2D array of [`Tile`]s.
///
/// Coordinates are signed so that callers working in world space can probe
/// outside the grid; every accessor treats out-of-range coordinates as absent.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a `width × height` grid filled with [`TileType::Empty`].
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width * height],
        }
    }

    /// Wraps the grid for sharing with a chunk coordinator.
    pub fn into_shared(self) -> SharedGrid {
        Arc::new(RwLock::new(self))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_valid_coordinate(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if self.is_valid_coordinate(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Tile at `(x, y)`, or `None` outside the grid.
    pub fn tile(&self, x: i64, y: i64) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    /// Mutable tile at `(x, y)`, or `None` outside the grid.
    pub fn tile_mut(&mut self, x: i64, y: i64) -> Option<&mut Tile> {
        self.index(x, y).map(move |i| &mut self.tiles[i])
    }

    /// Type of the tile at `(x, y)`, or `None` outside the grid.
    pub fn tile_type(&self, x: i64, y: i64) -> Option<TileType> {
        self.tile(x, y).map(Tile::kind)
    }

    pub fn set_tile_type(&mut self, x: i64, y: i64, kind: TileType) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.set_kind(kind);
        }
    }

    pub fn set_tile_walkable(&mut self, x: i64, y: i64, walkable: bool) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.walkable = walkable;
        }
    }

    pub fn set_tile_transparent(&mut self, x: i64, y: i64, transparent: bool) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.transparent = transparent;
        }
    }

    pub fn set_tile_height(&mut self, x: i64, y: i64, height: f32) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.height = height;
        }
    }

    /// Replaces every tile with a fresh tile of `kind`.
    pub fn fill(&mut self, kind: TileType) {
        for tile in &mut self.tiles {
            *tile = Tile::new(kind);
        }
    }

    /// Iterates over `(x, y, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i % width, i / width, tile))
    }

    /// Row-major tile slice.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty_tiles() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tiles().len(), 12);
        assert!(grid.iter().all(|(_, _, t)| t.kind() == TileType::Empty));
    }

    #[test]
    fn test_bounds_checks() {
        let grid = Grid::new(4, 3);
        assert!(grid.is_valid_coordinate(0, 0));
        assert!(grid.is_valid_coordinate(3, 2));
        assert!(!grid.is_valid_coordinate(4, 0));
        assert!(!grid.is_valid_coordinate(0, 3));
        assert!(!grid.is_valid_coordinate(-1, 0));
        assert!(grid.tile(-1, -1).is_none());
        assert!(grid.tile(10, 1).is_none());
    }

    #[test]
    fn test_setters_ignore_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        grid.set_tile_type(5, 5, TileType::Wall);
        grid.set_tile_height(-1, 0, 3.0);
        assert_eq!(grid, Grid::new(2, 2));
    }

    #[test]
    fn test_setters_write_in_bounds() {
        let mut grid = Grid::new(3, 3);
        grid.set_tile_type(1, 2, TileType::Wall);
        grid.set_tile_walkable(1, 2, true);
        grid.set_tile_transparent(1, 2, true);
        grid.set_tile_height(1, 2, 0.5);
        let tile = grid.tile(1, 2).unwrap();
        assert_eq!(tile.kind(), TileType::Wall);
        assert!(tile.walkable);
        assert!(tile.transparent);
        assert_eq!(tile.height, 0.5);
    }

    #[test]
    fn test_iter_is_row_major() {
        let mut grid = Grid::new(3, 2);
        grid.set_tile_type(2, 0, TileType::Stone);
        grid.set_tile_type(0, 1, TileType::Sand);
        let kinds: Vec<_> = grid.iter().map(|(x, y, t)| (x, y, t.kind())).collect();
        assert_eq!(kinds[2], (2, 0, TileType::Stone));
        assert_eq!(kinds[3], (0, 1, TileType::Sand));
    }

    #[test]
    fn test_fill_resets_tiles() {
        let mut grid = Grid::new(2, 2);
        grid.set_tile_height(0, 0, 9.0);
        grid.fill(TileType::Floor);
        assert!(grid.iter().all(|(_, _, t)| t.kind() == TileType::Floor && t.height == 0.0));
    }
}
