pub mod config;

mod app;
mod effects;
mod logging;
mod snapshot;
mod ui;

use std::path::Path;
use std::time::Duration;

use monitor_logging::{monitor_info, monitor_warn};

use config::{load_with_fallback, AppConfig, ConfigOverrides, BASE_URL_ENV};
use logging::LogDestination;

pub fn run_dashboard(config_path: &Path, overrides: ConfigOverrides) -> anyhow::Result<()> {
    let config = prepare(config_path, overrides, LogDestination::File);
    app::run(&config)
}

pub fn run_snapshot(
    config_path: &Path,
    overrides: ConfigOverrides,
    out: &Path,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let config = prepare(config_path, overrides, LogDestination::Both);
    let path = snapshot::run(&config, out, Duration::from_secs(timeout_secs))?;
    println!("{}", path.display());
    Ok(())
}

fn prepare(config_path: &Path, overrides: ConfigOverrides, destination: LogDestination) -> AppConfig {
    let (config, problem) = load_with_fallback(config_path);
    let config = config.resolve(std::env::var(BASE_URL_ENV).ok(), overrides);
    logging::initialize(destination, config.level_filter());
    if let Some(err) = problem {
        monitor_warn!("{err}; using defaults");
    }
    monitor_info!("spoolmon {} against {}", env!("CARGO_PKG_VERSION"), config.base_url);
    config
}
