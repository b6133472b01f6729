//! `isoworld`: generate a terrain, dungeon or chunk-streamed map from the
//! command line.
//!
//! Run with: `cargo run -p isoworld-app -- --kind dungeon --seed 42`

mod preview;
mod session;

use std::process::ExitCode;

use clap::Parser;
use isoworld_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    isoworld_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Map: {}x{} | kind: {:?} | mode: {}",
        config.map.width, config.map.height, config.map.kind, config.planet.terrain_mode
    );

    match session::run(&config) {
        Ok(session) => {
            if config.debug.ascii_preview {
                println!("{}", preview::render(&session.grid));
            }
            info!(seed = session.seed, "{}", session.summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Generation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
