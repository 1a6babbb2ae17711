//! Startup configuration: RON file, then `SPOOLMON_API_BASE`, then command-line flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use monitor_core::{DashboardOptions, Tab, DEFAULT_LOG_LINES, DEFAULT_LOG_NAME};
use monitor_engine::{clamp_interval, EngineConfig, FetchSettings};
use monitor_logging::{monitor_warn, parse_level};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "spoolmon.ron";
pub const BASE_URL_ENV: &str = "SPOOLMON_API_BASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub refresh_interval_secs: u64,
    pub auto_refresh: bool,
    pub log_name: String,
    pub log_lines: u32,
    pub downloads_dir: PathBuf,
    pub initial_tab: Option<String>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: fetch.base_url,
            refresh_interval_secs: 10,
            auto_refresh: true,
            log_name: DEFAULT_LOG_NAME.to_string(),
            log_lines: DEFAULT_LOG_LINES,
            downloads_dir: PathBuf::from("downloads"),
            initial_tab: None,
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub auto_refresh: Option<bool>,
    pub log_name: Option<String>,
    pub log_lines: Option<u32>,
    pub downloads_dir: Option<PathBuf>,
    pub initial_tab: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Applies the environment base URL and then the command-line overrides.
    pub fn resolve(mut self, env_base_url: Option<String>, overrides: ConfigOverrides) -> Self {
        if let Some(url) = env_base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(secs) = overrides.refresh_interval_secs {
            self.refresh_interval_secs = secs;
        }
        if let Some(enabled) = overrides.auto_refresh {
            self.auto_refresh = enabled;
        }
        if let Some(name) = overrides.log_name {
            self.log_name = name;
        }
        if let Some(lines) = overrides.log_lines {
            self.log_lines = lines;
        }
        if let Some(dir) = overrides.downloads_dir {
            self.downloads_dir = dir;
        }
        if let Some(tab) = overrides.initial_tab {
            self.initial_tab = Some(tab);
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn level_filter(&self) -> LevelFilter {
        parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn refresh_interval(&self) -> Duration {
        clamp_interval(Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        let initial_tab = self.initial_tab.as_deref().and_then(|name| {
            let tab = Tab::from_name(name);
            if tab.is_none() {
                monitor_warn!("unknown initial tab {name:?}; showing the first tab");
            }
            tab
        });
        let log_name = if self.log_name.trim().is_empty() {
            DEFAULT_LOG_NAME.to_string()
        } else {
            self.log_name.trim().to_string()
        };
        DashboardOptions {
            initial_tab,
            auto_refresh: self.auto_refresh,
            refresh_interval: self.refresh_interval(),
            log_name,
            log_lines: self.log_lines,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch: FetchSettings {
                base_url: self.base_url.clone(),
                ..FetchSettings::default()
            },
            downloads_dir: self.downloads_dir.clone(),
        }
    }
}

/// Loads `path`, falling back to defaults when it cannot be used.
///
/// The problem is returned rather than logged because logging is configured
/// from the result.
pub fn load_with_fallback(path: &Path) -> (AppConfig, Option<ConfigError>) {
    match AppConfig::load(path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}
