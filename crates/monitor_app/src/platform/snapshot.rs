//! One-shot HTML snapshot of the spool and job log lists.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use monitor_core::{
    joblog_table, render_page, spool_table, Effect, Fetched, JobLogEntry, ListFilter, Msg,
    SpoolEntry, TableBody, TableView,
};
use monitor_engine::{AtomicFileWriter, EngineHandle};
use monitor_logging::{monitor_debug, monitor_info, monitor_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;

const PAGE_TITLE: &str = "Spool monitor snapshot";
const SPOOLS_REQUEST: u64 = 1;
const JOBLOGS_REQUEST: u64 = 2;

pub fn run(config: &AppConfig, out: &Path, timeout: Duration) -> anyhow::Result<PathBuf> {
    let engine = EngineHandle::new(config.engine_config()).context("starting fetch engine")?;
    let runner = EffectRunner::new(engine);
    monitor_info!("taking snapshot of {}", config.base_url);
    runner.run(vec![
        Effect::LoadSpools {
            request: SPOOLS_REQUEST,
            filter: ListFilter::default(),
        },
        Effect::LoadJobLogs {
            request: JOBLOGS_REQUEST,
            filter: ListFilter::default(),
        },
    ]);

    let deadline = Instant::now() + timeout;
    let mut spools = None;
    let mut joblogs = None;
    while spools.is_none() || joblogs.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match runner.wait(remaining) {
            Some(Msg::SpoolsLoaded { result, .. }) => spools = Some(result),
            Some(Msg::JobLogsLoaded { result, .. }) => joblogs = Some(result),
            Some(other) => monitor_debug!("snapshot ignoring {other:?}"),
            None => break,
        }
    }

    let timed_out = || {
        monitor_warn!("snapshot gave up after {}s", timeout.as_secs());
        format!("no response within {}s", timeout.as_secs())
    };
    let page = build_snapshot_page(
        spools.unwrap_or_else(|| Err(timed_out())),
        joblogs.unwrap_or_else(|| Err(timed_out())),
        &chrono::Utc::now().to_rfc3339(),
    );

    let dir = out
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = out
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid output path {}", out.display()))?;
    let path = AtomicFileWriter::new(dir.to_path_buf())
        .write(file_name, page.as_bytes())
        .with_context(|| format!("writing {}", out.display()))?;
    monitor_info!("snapshot written to {}", path.display());
    Ok(path)
}

/// Full page; a list that failed to load shows the error in place of its rows.
pub fn build_snapshot_page(
    spools: Fetched<Vec<SpoolEntry>>,
    joblogs: Fetched<Vec<JobLogEntry>>,
    generated_at: &str,
) -> String {
    let sections = [section(spools, spool_table), section(joblogs, joblog_table)];
    render_page(PAGE_TITLE, generated_at, &sections)
}

fn section<T>(result: Fetched<Vec<T>>, table: fn(&[T]) -> TableView) -> TableView {
    match result {
        Ok(entries) => table(&entries),
        Err(err) => TableView {
            body: TableBody::Placeholder(format!("Failed to load: {err}")),
            ..table(&[])
        },
    }
}
