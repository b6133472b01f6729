//! Water bodies and steepest-descent river carving.

use isoworld_grid::{Grid, Tile, TileType};

use super::FieldSet;

const SHALLOW_BAND: f64 = 0.05;
const RIVER_SOURCE_MIN: f64 = 0.7;
const RIVER_HEIGHT: f32 = 0.05;

const NEIGHBORS: [(i64, i64); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// Re-floods every cell below the water line, overriding any earlier pass.
pub(super) fn fill_water_bodies(grid: &mut Grid, fields: &FieldSet, water_level: f64) {
    for y in 0..fields.height {
        for x in 0..fields.width {
            let e = fields.elevation[fields.index(x, y)];
            let Some(tile) = grid.tile_mut(x as i64, y as i64) else {
                continue;
            };
            if e < water_level {
                flood(tile, TileType::Water, 0.1);
            } else if e < water_level + SHALLOW_BAND {
                flood(tile, TileType::ShallowWater, 0.05);
            }
        }
    }
}

fn flood(tile: &mut Tile, kind: TileType, height: f32) {
    tile.set_kind(kind);
    tile.height = height;
    tile.decorations.clear();
}

/// Carves up to `max(1, sqrt(w*h) * 0.01)` rivers downhill from the highest
/// local maxima above 0.7. Returns the number of rivers that carved at least
/// one cell.
pub(super) fn carve_rivers(grid: &mut Grid, fields: &FieldSet) -> usize {
    let (w, h) = (fields.width, fields.height);
    let max_rivers = ((((w * h) as f64).sqrt() * 0.01) as usize).max(1);
    let max_steps = 2 * w.max(h);

    let mut sources = river_sources(fields);
    sources.sort_by(|&a, &b| fields.elevation[b].total_cmp(&fields.elevation[a]).then(a.cmp(&b)));

    let mut carved_rivers = 0;
    for &source in sources.iter().take(max_rivers) {
        let (mut x, mut y) = ((source % w) as i64, (source / w) as i64);
        let mut carved = 0;
        for _ in 0..max_steps {
            let Some((nx, ny)) = lowest_neighbor(fields, x, y) else {
                break;
            };
            let Some(tile) = grid.tile_mut(nx, ny) else {
                break;
            };
            if tile.kind().is_water() {
                break;
            }
            flood(tile, TileType::Water, RIVER_HEIGHT);
            carved += 1;
            (x, y) = (nx, ny);
        }
        if carved > 0 {
            carved_rivers += 1;
        }
    }
    carved_rivers
}

/// Indices of cells above the source threshold with no strictly higher neighbor.
fn river_sources(fields: &FieldSet) -> Vec<usize> {
    let mut sources = Vec::new();
    for y in 0..fields.height as i64 {
        for x in 0..fields.width as i64 {
            let e = elevation_at(fields, x, y).unwrap_or(0.0);
            if e <= RIVER_SOURCE_MIN {
                continue;
            }
            let is_peak = NEIGHBORS
                .iter()
                .all(|&(dx, dy)| elevation_at(fields, x + dx, y + dy).is_none_or(|n| n <= e));
            if is_peak {
                sources.push(fields.index(x as usize, y as usize));
            }
        }
    }
    sources
}

/// The strictly lowest 8-neighbor, first in scan order on ties.
fn lowest_neighbor(fields: &FieldSet, x: i64, y: i64) -> Option<(i64, i64)> {
    let current = elevation_at(fields, x, y)?;
    let mut best: Option<((i64, i64), f64)> = None;
    for &(dx, dy) in &NEIGHBORS {
        let (nx, ny) = (x + dx, y + dy);
        let Some(e) = elevation_at(fields, nx, ny) else {
            continue;
        };
        if e < current && best.is_none_or(|(_, b)| e < b) {
            best = Some(((nx, ny), e));
        }
    }
    best.map(|(pos, _)| pos)
}

fn elevation_at(fields: &FieldSet, x: i64, y: i64) -> Option<f64> {
    if x < 0 || y < 0 || x as usize >= fields.width || y as usize >= fields.height {
        return None;
    }
    Some(fields.elevation[fields.index(x as usize, y as usize)])
}
