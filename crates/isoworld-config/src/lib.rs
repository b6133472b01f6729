//! Configuration for the isoworld generator.
//!
//! Settings persist to disk as a RON file, every section falls back to its
//! defaults when missing, and command-line flags override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ChunkConfig, Config, DebugConfig, DungeonSettings, MapConfig, MapKind, PlanetConfig,
    default_config_dir,
};
pub use error::ConfigError;
