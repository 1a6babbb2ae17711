mod platform;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use platform::config::ConfigOverrides;

/// Terminal dashboard for the spool bridge API.
#[derive(Debug, Parser)]
#[command(name = "spoolmon", version, about)]
struct Cli {
    /// RON configuration file.
    #[arg(long, short = 'c', value_name = "FILE", default_value = platform::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// API base URL (also read from SPOOLMON_API_BASE).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Auto-refresh interval, clamped to 5..=10 seconds.
    #[arg(long, value_name = "SECS")]
    refresh_interval: Option<u64>,

    /// Start with auto-refresh switched off.
    #[arg(long)]
    no_auto_refresh: bool,

    /// Log file shown on the Logs tab.
    #[arg(long, value_name = "NAME")]
    log_name: Option<String>,

    #[arg(long, value_name = "N")]
    log_lines: Option<u32>,

    /// Where downloaded spools and job logs are written.
    #[arg(long, value_name = "DIR")]
    downloads_dir: Option<PathBuf>,

    /// Tab shown at startup (spools, joblogs, logs, pids, console).
    #[arg(long, value_name = "TAB")]
    tab: Option<String>,

    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive dashboard (default).
    Watch,
    /// Fetch spools and job logs once and write a static HTML page.
    Snapshot {
        #[arg(long, short = 'o', value_name = "FILE", default_value = "spoolmon-snapshot.html")]
        out: PathBuf,
        /// Give up on responses after this many seconds.
        #[arg(long, value_name = "SECS", default_value_t = 30)]
        timeout: u64,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            refresh_interval_secs: self.refresh_interval,
            auto_refresh: self.no_auto_refresh.then_some(false),
            log_name: self.log_name.clone(),
            log_lines: self.log_lines,
            downloads_dir: self.downloads_dir.clone(),
            initial_tab: self.tab.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overrides = cli.overrides();
    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => platform::run_dashboard(&cli.config, overrides),
        Command::Snapshot { out, timeout } => {
            platform::run_snapshot(&cli.config, overrides, &out, timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_watch() {
        let cli = Cli::try_parse_from(["spoolmon"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("spoolmon.ron"));
    }

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "spoolmon",
            "--base-url",
            "http://bridge:8000",
            "--no-auto-refresh",
            "--tab",
            "joblogs",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("http://bridge:8000"));
        assert_eq!(overrides.auto_refresh, Some(false));
        assert_eq!(overrides.initial_tab.as_deref(), Some("joblogs"));
        assert_eq!(overrides.refresh_interval_secs, None);
    }

    #[test]
    fn snapshot_takes_output_path() {
        let cli = Cli::try_parse_from(["spoolmon", "snapshot", "--out", "page.html"]).unwrap();
        match cli.command {
            Some(Command::Snapshot { out, timeout }) => {
                assert_eq!(out, PathBuf::from("page.html"));
                assert_eq!(timeout, 30);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
