//! Configuration sections with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";
const APP_NAME: &str = "isoworld";

/// Platform config directory for isoworld, or `./isoworld` when the OS has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// What to generate and where to put it.
    pub map: MapConfig,
    /// World generation knobs.
    pub planet: PlanetConfig,
    /// Chunk streaming.
    pub chunks: ChunkConfig,
    /// Dungeon layout limits.
    pub dungeon: DungeonSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Which generator the binary runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    /// One-shot terrain synthesis over the whole map.
    #[default]
    Terrain,
    /// Rooms and corridors.
    Dungeon,
    /// Terrain streamed in chunks around the map center.
    Chunked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in tiles.
    pub width: usize,
    /// Map height in tiles.
    pub height: usize,
    /// Generator to run.
    pub kind: MapKind,
    /// Where to save the generated tile map, if anywhere.
    pub output: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 48,
            kind: MapKind::Terrain,
            output: None,
        }
    }
}

/// Planet-level generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// World seed; a random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Mean surface temperature in °C.
    pub average_temperature: f64,
    /// Life raises the base humidity.
    pub has_life: bool,
    /// Fraction of the surface under water (0.0 - 1.0).
    pub water_coverage: f64,
    /// Resource abundance (0.0 - 1.0).
    pub resource_richness: f64,
    /// Terrain mode name: default, archipelago, mountainous, crater, volcanic or alien.
    pub terrain_mode: String,
    /// Base noise frequency.
    pub noise_scale: f64,
    /// Terrain roughness (0.0 - 1.0).
    pub roughness: f64,
    /// Biome name applied to every tile instead of climate selection.
    pub forced_biome: Option<String>,
    /// RON biome catalog replacing the built-in one.
    pub biome_catalog: Option<PathBuf>,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            seed: None,
            average_temperature: 20.0,
            has_life: true,
            water_coverage: 0.3,
            resource_richness: 0.5,
            terrain_mode: "default".to_string(),
            noise_scale: 0.05,
            roughness: 0.5,
            forced_biome: None,
            biome_catalog: None,
        }
    }
}

/// Chunk streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkConfig {
    /// Chunk side length in tiles.
    pub chunk_size: usize,
    /// Background generation threads (0 = one per CPU).
    pub worker_threads: usize,
    /// Visible radius in tiles around the view center.
    pub view_radius: u32,
    /// Chunks nearest the view center generated before `update` returns.
    pub immediate_chunks: usize,
    /// Derive chunk seeds with the old additive formula.
    pub legacy_seeding: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            worker_threads: 0,
            view_radius: 32,
            immediate_chunks: 1,
            legacy_seeding: false,
        }
    }
}

/// Dungeon layout limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DungeonSettings {
    /// Fewest rooms to aim for.
    pub min_rooms: usize,
    /// Most rooms to place.
    pub max_rooms: usize,
    /// Smallest room side in tiles, walls included.
    pub min_room_size: usize,
    /// Largest room side in tiles, walls included.
    pub max_room_size: usize,
    /// Longest gap between connected rooms.
    pub max_corridor_length: usize,
    /// Biome name used to theme floors and walls.
    pub biome: String,
}

impl Default for DungeonSettings {
    fn default() -> Self {
        Self {
            min_rooms: 5,
            max_rooms: 12,
            min_room_size: 5,
            max_room_size: 12,
            max_corridor_length: 8,
            biome: "temperate_plains".to_string(),
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Print the generated map as ASCII to stdout.
    pub ascii_preview: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ascii_preview: true,
        }
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read `config.ron`; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh != self {
            log::info!("Config reloaded with changes");
            Ok(Some(fresh))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("width: 80"), "{ron_str}");
        assert!(ron_str.contains("kind: terrain"), "{ron_str}");
        assert!(ron_str.contains("chunk_size: 16"), "{ron_str}");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = ron::from_str("(map: (width: 200, kind: dungeon))").unwrap();
        assert_eq!(config.map.width, 200);
        assert_eq!(config.map.height, 48);
        assert_eq!(config.map.kind, MapKind::Dungeon);
        assert_eq!(config.dungeon, DungeonSettings::default());
        assert_eq!(config.chunks, ChunkConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let result: Result<Config, _> = ron::from_str("(render: (vsync: true))");
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_optional_values_parse() {
        let config: Config = ron::from_str(
            r#"(planet: (seed: Some(42), forced_biome: Some("desert")), map: (output: Some("w.map")))"#,
        )
        .unwrap();
        assert_eq!(config.planet.seed, Some(42));
        assert_eq!(config.planet.forced_biome.as_deref(), Some("desert"));
        assert_eq!(config.map.output, Some(PathBuf::from("w.map")));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.map.kind = MapKind::Chunked;
        config.planet.seed = Some(7);
        config.chunks.legacy_seeding = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("fresh");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.dungeon.max_rooms = 20;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.dungeon.max_rooms), Some(20));
    }

    #[test]
    fn test_invalid_ron_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_default_config_dir_ends_with_app_name() {
        assert!(default_config_dir().ends_with(APP_NAME));
    }
}
