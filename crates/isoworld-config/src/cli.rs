//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, MapKind};

/// isoworld command-line arguments.
///
/// Values given here override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "isoworld", about = "Procedural isometric world generator")]
pub struct CliArgs {
    /// Map width in tiles.
    #[arg(long)]
    pub width: Option<usize>,

    /// Map height in tiles.
    #[arg(long)]
    pub height: Option<usize>,

    /// Generator to run.
    #[arg(long, value_enum)]
    pub kind: Option<MapKind>,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Terrain mode (default, archipelago, mountainous, crater, volcanic, alien).
    #[arg(long)]
    pub mode: Option<String>,

    /// Save the generated tile map to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Chunk worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.map.width = w;
        }
        if let Some(h) = args.height {
            self.map.height = h;
        }
        if let Some(kind) = args.kind {
            self.map.kind = kind;
        }
        if let Some(seed) = args.seed {
            self.planet.seed = Some(seed);
        }
        if let Some(ref mode) = args.mode {
            self.planet.terrain_mode = mode.clone();
        }
        if let Some(ref path) = args.output {
            self.map.output = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(workers) = args.workers {
            self.chunks.worker_threads = workers;
        }
    }
}
