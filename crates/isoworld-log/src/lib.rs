//! Structured logging for isoworld.
//!
//! Library crates only emit `tracing` events; this crate installs the one
//! subscriber that prints them. Console output is always on, and debug builds
//! can also write JSON lines to a file.

use std::path::Path;

use isoworld_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE: &str = "isoworld.log";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, else from `config.debug.log_level`,
/// else `info`. With `debug_build` and a `log_dir`, events are also written as
/// JSON to `isoworld.log` in that directory.
///
/// # Examples
///
/// ```no_run
/// use isoworld_config::Config;
/// use isoworld_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));
    build_subscriber(log_dir, debug_build, env_filter).init();
}

/// The filter used when neither `RUST_LOG` nor the config names a level.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

fn build_subscriber(
    log_dir: Option<&Path>,
    debug_build: bool,
    env_filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // chunk workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let file_layer = if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        Some(
            fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
}
