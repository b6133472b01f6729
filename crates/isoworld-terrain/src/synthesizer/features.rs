//! Resource scaling, point-of-interest stamping and biome decorations.

use isoworld_grid::{Decoration, Grid, Tile, TileType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::biome::BiomeCatalog;

const MINERAL_THRESHOLD: f32 = 0.7;
const MINERAL_CHANCE: f64 = 0.1;
const MINERAL_BOOST: f32 = 1.3;

const POI_SITE_ATTEMPTS: usize = 50;

const RUIN_MARKER_ID: u32 = 900;
const CRATER_GLOW_ID: u32 = 901;
const CRYSTAL_OUTCROP_ID: u32 = 902;

const MAX_DECORATIONS_PER_TILE: usize = 3;

/// Scales every tile's resource density by richness with a small jitter, then
/// gives rich land tiles a chance to become mineral deposits. Returns the
/// number of deposits created.
pub(super) fn place_resources(grid: &mut Grid, richness: f64, rng: &mut ChaCha8Rng) -> usize {
    let factor = (0.5 + richness) as f32;
    let mut deposits = 0;
    let (w, h) = (grid.width() as i64, grid.height() as i64);
    for y in 0..h {
        for x in 0..w {
            let Some(tile) = grid.tile_mut(x, y) else {
                continue;
            };
            let jitter = (rng.random::<f32>() - 0.5) * 0.1;
            let density = tile.resource_density() * factor + jitter;
            tile.set_resource_density(density);

            if density > MINERAL_THRESHOLD && !tile.kind().is_fluid() && rng.random_bool(MINERAL_CHANCE) {
                tile.set_kind(TileType::MineralDeposit);
                tile.set_resource_density(density * MINERAL_BOOST);
                deposits += 1;
            }
        }
    }
    deposits
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PoiKind {
    Ruins,
    Crater,
    RockFormation,
}

impl PoiKind {
    fn roll(rng: &mut ChaCha8Rng) -> Self {
        let r = rng.random::<f64>();
        if r < 0.4 {
            PoiKind::Ruins
        } else if r < 0.7 {
            PoiKind::Crater
        } else {
            PoiKind::RockFormation
        }
    }

    fn tile_type(self) -> TileType {
        match self {
            PoiKind::Ruins => TileType::Ruins,
            PoiKind::Crater => TileType::Crater,
            PoiKind::RockFormation => TileType::RockFormation,
        }
    }
}

/// Stamps `max(1, sqrt(w*h) * 0.01)` radial structures on random land tiles.
/// Returns how many were placed; a POI is skipped when no land site is found.
pub(super) fn place_points_of_interest(grid: &mut Grid, rng: &mut ChaCha8Rng) -> usize {
    let (w, h) = (grid.width(), grid.height());
    let count = ((((w * h) as f64).sqrt() * 0.01) as usize).max(1);
    let max_size = (w.min(h) / 12).max(2);

    let mut placed = 0;
    for _ in 0..count {
        let Some((cx, cy)) = find_land_site(grid, rng) else {
            continue;
        };
        let size = rng.random_range(2..=max_size);
        let kind = PoiKind::roll(rng);
        stamp_poi(grid, cx, cy, size, kind, rng);
        placed += 1;
    }
    placed
}

fn find_land_site(grid: &Grid, rng: &mut ChaCha8Rng) -> Option<(i64, i64)> {
    for _ in 0..POI_SITE_ATTEMPTS {
        let x = rng.random_range(0..grid.width()) as i64;
        let y = rng.random_range(0..grid.height()) as i64;
        if grid.tile(x, y).is_some_and(|t| !t.kind().is_fluid()) {
            return Some((x, y));
        }
    }
    None
}

/// Stamps one POI: every non-fluid tile within `size` of the center is
/// converted with probability `min(1, 1.2 * closeness)`.
fn stamp_poi(grid: &mut Grid, cx: i64, cy: i64, size: usize, kind: PoiKind, rng: &mut ChaCha8Rng) {
    let radius = size as i64;
    for y in cy - radius..=cy + radius {
        for x in cx - radius..=cx + radius {
            let dist = (((x - cx).pow(2) + (y - cy).pow(2)) as f64).sqrt();
            if dist > size as f64 {
                continue;
            }
            let closeness = 1.0 - dist / size as f64;
            if rng.random::<f64>() >= (1.2 * closeness).min(1.0) {
                continue;
            }
            let Some(tile) = grid.tile_mut(x, y) else {
                continue;
            };
            if tile.kind().is_fluid() {
                continue;
            }
            tile.set_kind(kind.tile_type());
            apply_poi(tile, kind, closeness as f32, rng);
        }
    }
}

fn apply_poi(tile: &mut Tile, kind: PoiKind, closeness: f32, rng: &mut ChaCha8Rng) {
    match kind {
        PoiKind::Ruins => {
            tile.height = 0.3 + 0.2 * closeness;
            if rng.random_bool(0.3) {
                tile.set_resource_density(tile.resource_density() + 0.2);
            }
            if rng.random_bool(0.1) {
                tile.decorations.push(Decoration {
                    id: RUIN_MARKER_ID,
                    name: "ancient_ruin".to_owned(),
                    scale: 1.0,
                    animated: false,
                });
            }
        }
        PoiKind::Crater => {
            tile.height = -0.3 * closeness;
            if rng.random_bool(0.5) {
                tile.set_radiation(tile.radiation() + 0.5 * closeness);
            }
            if rng.random_bool(0.05) {
                tile.decorations.push(Decoration {
                    id: CRATER_GLOW_ID,
                    name: "crater_glow".to_owned(),
                    scale: 0.5 + closeness,
                    animated: true,
                });
            }
        }
        PoiKind::RockFormation => {
            tile.height = 0.5 + 0.5 * closeness;
            if rng.random_bool(0.4) {
                tile.set_resource_density(tile.resource_density() + 0.3);
            }
            if rng.random_bool(0.15) {
                tile.decorations.push(Decoration {
                    id: CRYSTAL_OUTCROP_ID,
                    name: "crystal_outcrop".to_owned(),
                    scale: rng.random_range(0.6..=1.4),
                    animated: false,
                });
            }
        }
    }
}

/// Rolls up to three biome decorations per land tile. Returns the total added.
pub(super) fn place_decorations(grid: &mut Grid, catalog: &BiomeCatalog, rng: &mut ChaCha8Rng) -> usize {
    let mut total = 0;
    let (w, h) = (grid.width() as i64, grid.height() as i64);
    for y in 0..h {
        for x in 0..w {
            let Some(tile) = grid.tile_mut(x, y) else {
                continue;
            };
            if tile.kind().is_fluid() {
                continue;
            }
            let Some(biome) = tile.biome.and_then(|id| catalog.get(id)) else {
                continue;
            };
            let max_count = rng.random_range(0..=MAX_DECORATIONS_PER_TILE);
            let rolled = biome.roll_decorations(max_count, rng);
            total += rolled.len();
            tile.decorations.extend(rolled);
        }
    }
    total
}
