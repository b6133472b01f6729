//! Temperature and humidity fields, and the elevation/climate passes that
//! turn the scalar fields into tile types.

use isoworld_grid::{Color, Grid, Tile, TileType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{FieldSet, NoiseLayers};
use crate::noise_field::FractalParams;
use crate::params::{GenerationMode, GenerationParameters};

/// Tiles colder than this on land freeze.
const FREEZING_POINT: f64 = -10.0;
/// Tiles hotter than this burn or melt into lava.
const BURNING_POINT: f64 = 80.0;
const LAVA_CHANCE: f64 = 0.3;
/// Volcanic lava mask above this turns land into lava.
const LAVA_MASK_THRESHOLD: f64 = 0.6;

const SHALLOW_BAND: f64 = 0.05;
const GRASS_CEILING: f64 = 0.4;
const HILL_CEILING: f64 = 0.7;

/// Base temperature with a latitude bulge at the map's vertical center,
/// an elevation lapse above sea level and a small noise jitter.
pub(super) fn compute_temperature(
    fields: &mut FieldSet,
    layers: &NoiseLayers,
    fractal: &FractalParams,
    params: &GenerationParameters,
    mode: GenerationMode,
) {
    let jitter = fractal.with_octaves(3);
    let cell_scale = fractal.scale * 2.0;
    let rows = fields.height.saturating_sub(1).max(1) as f64;

    for y in 0..fields.height {
        let lat = if fields.height > 1 { y as f64 / rows } else { 0.5 };
        let latitude = 1.0 - 2.0 * (lat - 0.5).abs();
        for x in 0..fields.width {
            let i = fields.index(x, y);
            let (fx, fy) = (x as f64, y as f64);
            let elevation = fields.elevation[i];
            let noise = layers.climate.fractal(fx, fy, &jitter);

            let mut t = params.base_temperature + (latitude - 0.5) * 40.0
                - (elevation - params.water_level).max(0.0) * 60.0
                + (noise - 0.5) * 10.0;
            match mode {
                GenerationMode::Volcanic => t += fields.heat[i] * 120.0,
                GenerationMode::Alien => t += (layers.cells.cellular(fx, fy, cell_scale) - 0.5) * 30.0,
                _ => {}
            }
            fields.temperature[i] = t;
        }
    }
}

/// Base humidity lowered by elevation and (non-linearly) by heat.
pub(super) fn compute_humidity(
    fields: &mut FieldSet,
    layers: &NoiseLayers,
    fractal: &FractalParams,
    params: &GenerationParameters,
) {
    let jitter = fractal.with_octaves(3);
    for y in 0..fields.height {
        for x in 0..fields.width {
            let i = fields.index(x, y);
            let warmth = fields.temperature[i].max(0.0) / 50.0;
            let noise = layers.moisture.fractal(x as f64, y as f64, &jitter);
            let h = params.base_humidity - 0.3 * fields.elevation[i] - 0.4 * warmth * warmth + (noise - 0.5) * 0.3;
            fields.humidity[i] = h.clamp(0.0, 1.0);
        }
    }
}

/// Buckets each cell's elevation into a tile type and render height, and
/// copies the scalar fields onto the tile.
pub(super) fn apply_elevation_bands(grid: &mut Grid, fields: &FieldSet, water_level: f64) {
    let shallow = water_level + SHALLOW_BAND;
    for y in 0..fields.height {
        for x in 0..fields.width {
            let i = fields.index(x, y);
            let Some(tile) = grid.tile_mut(x as i64, y as i64) else {
                continue;
            };
            let e = fields.elevation[i];
            let (kind, height) = if e < water_level {
                (TileType::Water, lerp_band(e, 0.0, water_level, 0.0, 0.1))
            } else if e < shallow {
                (TileType::ShallowWater, lerp_band(e, water_level, shallow, 0.05, 0.1))
            } else if e < GRASS_CEILING {
                (TileType::Grass, lerp_band(e, shallow, GRASS_CEILING, 0.1, 0.3))
            } else if e < HILL_CEILING {
                (TileType::Hill, lerp_band(e, shallow.max(GRASS_CEILING), HILL_CEILING, 0.3, 0.6))
            } else {
                (TileType::Mountain, lerp_band(e, shallow.max(HILL_CEILING), 1.0, 0.6, 1.0))
            };

            *tile = Tile::new(kind);
            tile.height = height as f32;
            tile.set_elevation(e as f32);
            tile.temperature = fields.temperature[i] as f32;
            tile.set_humidity(fields.humidity[i] as f32);
        }
    }
}

/// Linear map of `value` from `[lo, hi]` to `[out_lo, out_hi]`, clamped.
fn lerp_band(value: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    if hi - lo <= f64::EPSILON {
        return out_lo;
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

/// Freezes cold land, burns hot land and, in volcanic mode, floods lava cores.
pub(super) fn apply_temperature(
    grid: &mut Grid,
    fields: &FieldSet,
    water_level: f64,
    mode: GenerationMode,
    rng: &mut ChaCha8Rng,
) {
    for y in 0..fields.height {
        for x in 0..fields.width {
            let i = fields.index(x, y);
            if fields.elevation[i] < water_level {
                continue;
            }
            let Some(tile) = grid.tile_mut(x as i64, y as i64) else {
                continue;
            };
            if tile.kind().is_fluid() {
                continue;
            }

            let t = fields.temperature[i];
            if t < FREEZING_POINT {
                if tile.kind() == TileType::Mountain {
                    tile.color = tile.color.blend(Color::WHITE, 0.6);
                } else {
                    tile.set_kind(TileType::Snow);
                }
            } else if t > BURNING_POINT {
                if rng.random_bool(LAVA_CHANCE) {
                    tile.set_kind(TileType::Lava);
                } else {
                    tile.color = tile.color.darken(0.6);
                }
            }

            if mode == GenerationMode::Volcanic && fields.lava[i] > LAVA_MASK_THRESHOLD {
                tile.set_kind(TileType::Lava);
            }
        }
    }
}

/// Dries warm grass into sand and soaks wet, warm grass into mud.
pub(super) fn apply_humidity(grid: &mut Grid) {
    let (w, h) = (grid.width() as i64, grid.height() as i64);
    for y in 0..h {
        for x in 0..w {
            let Some(tile) = grid.tile_mut(x, y) else {
                continue;
            };
            if tile.kind() != TileType::Grass {
                continue;
            }
            let humidity = tile.humidity();
            if humidity < 0.2 && tile.temperature > 25.0 {
                tile.set_kind(TileType::Sand);
            } else if humidity > 0.8 && tile.temperature > 15.0 {
                tile.set_kind(TileType::Mud);
            }
        }
    }
}
