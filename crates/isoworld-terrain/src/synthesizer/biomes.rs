//! Per-tile biome assignment and one-pass border smoothing.

use isoworld_grid::{BiomeId, Grid, Tile, TileType};
use rand_chacha::ChaCha8Rng;

use super::FieldSet;
use crate::biome::{Biome, BiomeCatalog, select_biome};
use crate::params::{GenerationMode, GenerationParameters};

/// Alien-mode strangeness above this forces the alien jungle biome.
const STRANGENESS_OVERRIDE: f64 = 0.7;

/// Assigns a biome to every tile and re-rolls non-fluid tile types from it.
pub(super) fn distribute(
    grid: &mut Grid,
    fields: &FieldSet,
    params: &GenerationParameters,
    catalog: &BiomeCatalog,
    mode: GenerationMode,
    rng: &mut ChaCha8Rng,
) {
    let forced = params.forced_biome.and_then(|id| {
        let found = catalog.get(id);
        if found.is_none() {
            tracing::warn!(biome = id.0, "Forced biome not in catalog, selecting per tile");
        }
        found
    });
    let alien = if mode == GenerationMode::Alien {
        catalog.get(BiomeId::ALIEN_JUNGLE)
    } else {
        None
    };

    for y in 0..fields.height {
        for x in 0..fields.width {
            let i = fields.index(x, y);
            let biome = if let Some(b) = forced {
                Some(b)
            } else if let Some(b) = alien.filter(|_| fields.strangeness[i] > STRANGENESS_OVERRIDE) {
                Some(b)
            } else {
                select_biome(catalog, fields.temperature[i], fields.humidity[i], fields.elevation[i], rng)
            };
            let (Some(biome), Some(tile)) = (biome, grid.tile_mut(x as i64, y as i64)) else {
                continue;
            };
            assign(tile, biome, rng);
        }
    }
}

/// Stamps `biome` onto `tile`; fluid tiles keep their type.
fn assign(tile: &mut Tile, biome: &Biome, rng: &mut ChaCha8Rng) {
    tile.biome = Some(biome.id());
    tile.set_resource_density(biome.resource_level() as f32);
    tile.set_radiation((biome.hazard_level() * 0.3) as f32);
    if tile.kind().is_fluid() {
        return;
    }
    let kind = biome.select_weighted_tile_type(rng);
    if kind != TileType::Empty {
        tile.set_kind(kind);
    }
}

/// One smoothing pass over a snapshot of the biome ids: each non-fluid tile
/// adopts the most common biome among its 8 neighbors when that differs from
/// its own. Ties go to the neighbor encountered first (row-major from the
/// top-left).
pub(super) fn smooth_borders(grid: &mut Grid, catalog: &BiomeCatalog, rng: &mut ChaCha8Rng) {
    let (w, h) = (grid.width() as i64, grid.height() as i64);
    let snapshot: Vec<Option<BiomeId>> = grid.tiles().iter().map(|t| t.biome).collect();
    let at = |x: i64, y: i64| -> Option<BiomeId> {
        if x < 0 || y < 0 || x >= w || y >= h {
            None
        } else {
            snapshot[(y * w + x) as usize]
        }
    };

    let mut counts: Vec<(BiomeId, u8)> = Vec::with_capacity(8);
    for y in 0..h {
        for x in 0..w {
            counts.clear();
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let Some(id) = at(x + dx, y + dy) else {
                        continue;
                    };
                    match counts.iter_mut().find(|(seen, _)| *seen == id) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((id, 1)),
                    }
                }
            }

            let mut majority: Option<(BiomeId, u8)> = None;
            for &(id, n) in &counts {
                if majority.is_none_or(|(_, best)| n > best) {
                    majority = Some((id, n));
                }
            }
            let Some((winner, _)) = majority else {
                continue;
            };

            let Some(tile) = grid.tile_mut(x, y) else {
                continue;
            };
            if tile.kind().is_fluid() || tile.biome == Some(winner) {
                continue;
            }
            if let Some(biome) = catalog.get(winner) {
                assign(tile, biome, rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn catalog() -> BiomeCatalog {
        let mut sand = Biome::new(BiomeId(1), "sand");
        sand.set_tile_weight(TileType::Sand, 1.0);
        let mut snow = Biome::new(BiomeId(2), "snow");
        snow.set_tile_weight(TileType::Snow, 1.0);
        BiomeCatalog::from_biomes([sand, snow]).unwrap()
    }

    fn land_grid(w: usize, h: usize, biome: BiomeId, kind: TileType) -> Grid {
        let mut grid = Grid::new(w, h);
        grid.fill(kind);
        for y in 0..h as i64 {
            for x in 0..w as i64 {
                grid.tile_mut(x, y).unwrap().biome = Some(biome);
            }
        }
        grid
    }

    #[test]
    fn test_isolated_tile_adopts_surrounding_biome() {
        let catalog = catalog();
        let mut grid = land_grid(3, 3, BiomeId(1), TileType::Sand);
        let centre = grid.tile_mut(1, 1).unwrap();
        centre.biome = Some(BiomeId(2));
        centre.set_kind(TileType::Snow);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        smooth_borders(&mut grid, &catalog, &mut rng);
        let centre = grid.tile(1, 1).unwrap();
        assert_eq!(centre.biome, Some(BiomeId(1)));
        assert_eq!(centre.kind(), TileType::Sand, "type must be re-rolled from the new biome");
    }

    #[test]
    fn test_fluid_tiles_are_not_smoothed() {
        let catalog = catalog();
        let mut grid = land_grid(3, 3, BiomeId(1), TileType::Sand);
        let centre = grid.tile_mut(1, 1).unwrap();
        centre.biome = Some(BiomeId(2));
        centre.set_kind(TileType::Water);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        smooth_borders(&mut grid, &catalog, &mut rng);
        let centre = grid.tile(1, 1).unwrap();
        assert_eq!(centre.biome, Some(BiomeId(2)));
        assert_eq!(centre.kind(), TileType::Water);
    }

    #[test]
    fn test_smoothing_reads_a_snapshot() {
        // A vertical snow stripe through sand: stripe tiles see mostly sand,
        // side tiles see mostly snow. Reading from a snapshot makes the two
        // swap instead of cascading row by row.
        let catalog = catalog();
        let mut grid = land_grid(3, 5, BiomeId(1), TileType::Sand);
        for y in 0..5 {
            grid.tile_mut(1, y).unwrap().biome = Some(BiomeId(2));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        smooth_borders(&mut grid, &catalog, &mut rng);
        for y in 0..5 {
            assert_eq!(grid.tile(1, y).unwrap().biome, Some(BiomeId(1)), "stripe tile y={y}");
            assert_eq!(grid.tile(0, y).unwrap().biome, Some(BiomeId(2)), "side tile y={y}");
        }
    }

    #[test]
    fn test_distribute_keeps_fluids() {
        let catalog = catalog();
        let mut fields = FieldSet::new(2, 1);
        fields.temperature = vec![20.0, 20.0];
        fields.humidity = vec![0.5, 0.5];
        fields.elevation = vec![0.1, 0.5];
        let mut grid = Grid::new(2, 1);
        grid.set_tile_type(0, 0, TileType::Lava);
        grid.set_tile_type(1, 0, TileType::Grass);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = GenerationParameters::default();
        distribute(&mut grid, &fields, &params, &catalog, GenerationMode::Default, &mut rng);
        assert_eq!(grid.tile_type(0, 0), Some(TileType::Lava));
        assert!(grid.tile(0, 0).unwrap().biome.is_some());
        assert!(matches!(grid.tile_type(1, 0), Some(TileType::Sand | TileType::Snow)));
    }

    #[test]
    fn test_alien_strangeness_override() {
        let mut catalog = catalog();
        let mut jungle = Biome::new(BiomeId::ALIEN_JUNGLE, "alien_jungle");
        jungle.set_temperature_range(1000.0, 2000.0);
        jungle.set_tile_weight(TileType::AlienGrowth, 1.0);
        catalog.register(jungle).unwrap();

        let mut fields = FieldSet::new(2, 1);
        fields.temperature = vec![20.0, 20.0];
        fields.elevation = vec![0.5, 0.5];
        fields.strangeness = vec![0.9, 0.1];
        let mut grid = Grid::new(2, 1);
        grid.fill(TileType::Grass);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = GenerationParameters::default();
        distribute(&mut grid, &fields, &params, &catalog, GenerationMode::Alien, &mut rng);
        assert_eq!(grid.tile(0, 0).unwrap().biome, Some(BiomeId::ALIEN_JUNGLE));
        assert_eq!(grid.tile_type(0, 0), Some(TileType::AlienGrowth));
        assert_ne!(grid.tile(1, 0).unwrap().biome, Some(BiomeId::ALIEN_JUNGLE));
    }
}
