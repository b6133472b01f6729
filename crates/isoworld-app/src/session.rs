//! Turns a loaded [`Config`] into one generated map.

use std::str::FromStr;
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use isoworld_config::{Config, MapKind, PlanetConfig};
use isoworld_dungeon::{DungeonConfig, DungeonError, DungeonGenerator};
use isoworld_grid::{BiomeId, Grid, TileMapError};
use isoworld_terrain::{
    BiomeCatalog, BiomeCatalogError, ChunkCoordinator, ChunkCoordinatorConfig, ChunkSeeding,
    GenerationError, GenerationMode, GenerationParameters, ParseModeError, PlanetProfile,
    TerrainSynthesizer, default_catalog,
};

/// How long a chunked session waits for background chunks before giving up.
const CHUNK_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("map must be at least 1x1, got {width}x{height}")]
    EmptyMap { width: usize, height: usize },
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    #[error("biome catalog: {0}")]
    Catalog(#[from] BiomeCatalogError),
    #[error("unknown biome: {0}")]
    UnknownBiome(String),
    #[error(transparent)]
    Terrain(#[from] GenerationError),
    #[error(transparent)]
    Dungeon(#[from] DungeonError),
    #[error("failed to save map: {0}")]
    Save(#[from] TileMapError),
    #[error("chunk generation did not finish within {0:?}")]
    ChunkTimeout(Duration),
}

/// A finished map plus a one-line description for the log.
pub struct Session {
    /// The generated map.
    pub grid: Grid,
    /// Seed actually used, drawn at random when none was configured.
    pub seed: u64,
    /// Counts reported by the generator.
    pub summary: String,
}

pub fn run(config: &Config) -> Result<Session, RunError> {
    let (width, height) = (config.map.width, config.map.height);
    if width == 0 || height == 0 {
        return Err(RunError::EmptyMap { width, height });
    }

    let seed = config.planet.seed.unwrap_or_else(rand::random);
    let catalog = Arc::new(load_catalog(&config.planet)?);
    tracing::info!(seed, width, height, kind = ?config.map.kind, biomes = catalog.len(), "Generating map");

    let mut grid = Grid::new(width, height);
    let summary = match config.map.kind {
        MapKind::Terrain => {
            let params = planet_parameters(&config.planet, &catalog, seed)?;
            let mode = params.mode;
            let report = TerrainSynthesizer::new(params, catalog).generate(&mut grid, mode)?;
            format!(
                "{mode} terrain: {} rivers, {} points of interest, {} mineral deposits, {} decorations",
                report.rivers, report.points_of_interest, report.mineral_deposits, report.decorations
            )
        }
        MapKind::Dungeon => {
            let biome = biome_id(&catalog, &config.dungeon.biome)?;
            let dungeon_config = DungeonConfig {
                min_rooms: config.dungeon.min_rooms,
                max_rooms: config.dungeon.max_rooms,
                min_room_size: config.dungeon.min_room_size,
                max_room_size: config.dungeon.max_room_size,
                max_corridor_length: config.dungeon.max_corridor_length,
            };
            let layout = DungeonGenerator::new(dungeon_config, seed).generate_map(&mut grid, biome)?;
            format!(
                "{} dungeon: {} rooms, {} corridors",
                config.dungeon.biome,
                layout.rooms.len(),
                layout.corridors.len()
            )
        }
        MapKind::Chunked => {
            let params = planet_parameters(&config.planet, &catalog, seed)?;
            let (grid_out, chunks) = stream_chunks(config, params, catalog, grid)?;
            grid = grid_out;
            format!("chunked terrain: {chunks} chunks")
        }
    };

    if let Some(path) = &config.map.output {
        grid.save(path)?;
        tracing::info!(path = %path.display(), "Saved tile map");
    }
    Ok(Session { grid, seed, summary })
}

fn load_catalog(planet: &PlanetConfig) -> Result<BiomeCatalog, RunError> {
    match &planet.biome_catalog {
        Some(path) => Ok(BiomeCatalog::load(path)?),
        None => Ok(default_catalog()),
    }
}

fn biome_id(catalog: &BiomeCatalog, name: &str) -> Result<BiomeId, RunError> {
    catalog
        .lookup_by_name(name)
        .map(|biome| biome.id())
        .ok_or_else(|| RunError::UnknownBiome(name.to_string()))
}

/// Maps the planet section onto synthesizer parameters.
pub fn planet_parameters(
    planet: &PlanetConfig,
    catalog: &BiomeCatalog,
    seed: u64,
) -> Result<GenerationParameters, RunError> {
    let profile = PlanetProfile {
        seed,
        average_temperature: planet.average_temperature,
        has_life: planet.has_life,
        water_coverage: planet.water_coverage,
        resource_richness: planet.resource_richness,
        mode: GenerationMode::from_str(&planet.terrain_mode)?,
    };
    let forced_biome = planet
        .forced_biome
        .as_deref()
        .map(|name| biome_id(catalog, name))
        .transpose()?;
    Ok(GenerationParameters {
        noise_scale: planet.noise_scale,
        roughness: planet.roughness,
        forced_biome,
        ..profile.to_parameters()
    }
    .sanitized())
}

fn stream_chunks(
    config: &Config,
    params: GenerationParameters,
    catalog: Arc<BiomeCatalog>,
    grid: Grid,
) -> Result<(Grid, usize), RunError> {
    let chunks = &config.chunks;
    let workers = match chunks.worker_threads {
        0 => ChunkCoordinatorConfig::default().worker_threads,
        n => n,
    };
    let coordinator = ChunkCoordinator::new(
        params,
        catalog,
        ChunkCoordinatorConfig {
            chunk_size: chunks.chunk_size,
            worker_threads: workers,
            immediate_chunks: chunks.immediate_chunks,
            seeding: if chunks.legacy_seeding {
                ChunkSeeding::Legacy
            } else {
                ChunkSeeding::Mixed
            },
        },
    );

    let shared = grid.into_shared();
    let center_x = (config.map.width / 2) as i64;
    let center_y = (config.map.height / 2) as i64;
    let requested = coordinator.update_visible_area(&shared, center_x, center_y, chunks.view_radius);

    let deadline = Instant::now() + CHUNK_DEADLINE;
    while coordinator.in_flight_count() > 0 {
        if Instant::now() >= deadline {
            return Err(RunError::ChunkTimeout(CHUNK_DEADLINE));
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let generated = coordinator.generated_chunk_count();
    tracing::debug!(requested, generated, "Chunk streaming finished");
    drop(coordinator);

    let grid = match Arc::try_unwrap(shared) {
        Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
        Err(shared) => shared.read().unwrap_or_else(PoisonError::into_inner).clone(),
    };
    Ok((grid, generated))
}

#[cfg(test)]
mod tests {
    use isoworld_grid::TileType;

    use super::*;

    fn config(kind: MapKind) -> Config {
        let mut config = Config::default();
        config.map.kind = kind;
        config.map.width = 40;
        config.map.height = 30;
        config.planet.seed = Some(11);
        config
    }

    #[test]
    fn test_terrain_session_fills_map() {
        let session = run(&config(MapKind::Terrain)).unwrap();
        assert_eq!(session.seed, 11);
        assert!(session.grid.tiles().iter().all(|t| t.kind() != TileType::Empty));
        assert!(session.summary.starts_with("default terrain"), "{}", session.summary);
    }

    #[test]
    fn test_dungeon_session_uses_biome_palette() {
        let mut config = config(MapKind::Dungeon);
        config.dungeon.biome = "desert".to_string();
        let session = run(&config).unwrap();
        assert!(session.grid.tiles().iter().any(|t| t.kind() == TileType::Sand));
        assert!(session.grid.tiles().iter().any(|t| t.kind() == TileType::RockFormation));
    }

    #[test]
    fn test_chunked_session_covers_visible_area() {
        let mut config = config(MapKind::Chunked);
        config.chunks.chunk_size = 8;
        config.chunks.worker_threads = 2;
        config.chunks.view_radius = 24;
        let session = run(&config).unwrap();
        assert!(
            session.grid.tiles().iter().all(|t| t.kind() != TileType::Empty),
            "radius 24 around the center covers the whole 40x30 map"
        );
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let mut bad_mode = config(MapKind::Terrain);
        bad_mode.planet.terrain_mode = "lunar".to_string();
        assert!(matches!(run(&bad_mode), Err(RunError::Mode(_))));

        let mut bad_biome = config(MapKind::Dungeon);
        bad_biome.dungeon.biome = "ocean".to_string();
        assert!(matches!(run(&bad_biome), Err(RunError::UnknownBiome(name)) if name == "ocean"));
    }

    #[test]
    fn test_forced_biome_is_resolved_by_name() {
        let mut planet = PlanetConfig::default();
        planet.forced_biome = Some("tundra".to_string());
        let params = planet_parameters(&planet, &default_catalog(), 3).unwrap();
        assert_eq!(params.forced_biome, Some(BiomeId::TUNDRA));
    }

    #[test]
    fn test_output_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(MapKind::Dungeon);
        config.map.output = Some(dir.path().join("dungeon.map"));
        let session = run(&config).unwrap();
        let loaded = Grid::load(&dir.path().join("dungeon.map")).unwrap();
        assert_eq!(loaded.width(), session.grid.width());
        assert_eq!(loaded.tile_type(0, 0), session.grid.tile_type(0, 0));
    }

    #[test]
    fn test_empty_map_is_rejected() {
        let mut config = config(MapKind::Terrain);
        config.map.width = 0;
        assert!(matches!(run(&config), Err(RunError::EmptyMap { width: 0, height: 30 })));
    }
}
