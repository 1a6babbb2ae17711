//! Render instructions derived from [`AppState`].
//!
//! Everything here is a pure mapping from data to what a host should draw; the
//! terminal UI and the HTML snapshot both consume these types.

use crate::entry::{JobLogEntry, LogTail, PidEntry, SpoolEntry};
use crate::format::format_optional_size;
use crate::{
    AppState, DownloadLink, EntryKind, ListFilter, ModalBody, ModalState, Region, StatusMessage,
    StreamStatus, Tab, ViewTarget,
};

pub const SPOOL_COLUMNS: &[&str] = &["Job name", "Job id", "RC", "Size", ""];
pub const JOBLOG_COLUMNS: &[&str] = &["File", "Job name", "Job id", "Size", ""];
pub const PID_COLUMNS: &[&str] = &["Name", "PID"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub tabs: Vec<TabView>,
    pub active_tab: Tab,
    pub section: SectionView,
    pub modal: Option<ModalView>,
    pub stream_live: bool,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub ready: ReadyView,
    /// Current log tail target, for hosts that let the user edit it.
    pub log_name: String,
    pub log_lines: u32,
    pub status: Option<StatusMessage>,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabView {
    pub tab: Tab,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyView {
    Ready,
    NotReady,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionView {
    Table(TableView),
    Text(TextView),
    Console(ConsoleView),
}

impl Default for SectionView {
    fn default() -> Self {
        SectionView::Table(TableView::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub filter: Option<ListFilter>,
    pub body: TableBody,
}

/// A placeholder is always exactly one row spanning all columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<RowView>),
    Placeholder(String),
}

impl Default for TableBody {
    fn default() -> Self {
        TableBody::Placeholder(LOADING.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub cells: Vec<String>,
    pub action: Option<ViewTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleView {
    pub lines: Vec<String>,
    /// Hosts keep the newest line in view while this is set.
    pub follow_tail: bool,
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub title: String,
    pub header_lines: Vec<String>,
    pub body: String,
    /// Body is file content (shown verbatim) rather than a status message.
    pub body_is_content: bool,
    pub download: Option<String>,
}

const LOADING: &str = "Loading...";

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    let section = match state.active_tab {
        Tab::Spools => SectionView::Table(with_filter(
            tracked_table(state.spools.region(), spool_table, "Spools", SPOOL_COLUMNS),
            &state.spool_filter,
        )),
        Tab::JobLogs => SectionView::Table(with_filter(
            tracked_table(state.joblogs.region(), joblog_table, "Job logs", JOBLOG_COLUMNS),
            &state.joblog_filter,
        )),
        Tab::Processes => SectionView::Table(tracked_table(
            state.pids.region(),
            pid_table,
            "Processes",
            PID_COLUMNS,
        )),
        Tab::Logs => SectionView::Text(log_tail_view(
            state.log_tail.region(),
            &state.log_name,
            state.log_lines,
        )),
        Tab::Console => SectionView::Console(ConsoleView {
            lines: state.console.iter().cloned().collect(),
            follow_tail: true,
            live: matches!(state.stream, StreamStatus::Live { .. }),
        }),
    };

    AppViewModel {
        tabs: Tab::ALL
            .iter()
            .map(|tab| TabView {
                tab: *tab,
                label: tab.label(),
                active: *tab == state.active_tab,
            })
            .collect(),
        active_tab: state.active_tab,
        section,
        modal: modal_view(&state.modal),
        stream_live: matches!(state.stream, StreamStatus::Live { .. }),
        auto_refresh: state.auto_refresh,
        refresh_interval_secs: state.refresh_interval.as_secs(),
        ready: match state.ready.region() {
            Region::Loaded(true) => ReadyView::Ready,
            Region::Loaded(false) => ReadyView::NotReady,
            _ => ReadyView::Unknown,
        },
        log_name: state.log_name.clone(),
        log_lines: state.log_lines,
        status: state.status.clone(),
        dirty,
    }
}

/// One row per spool, in server order; an empty list yields the single "No spools" row.
pub fn spool_table(entries: &[SpoolEntry]) -> TableView {
    let body = if entries.is_empty() {
        TableBody::Placeholder("No spools".to_string())
    } else {
        TableBody::Rows(
            entries
                .iter()
                .map(|entry| RowView {
                    cells: vec![
                        entry.job_name.clone().unwrap_or_default(),
                        entry.job_id.clone().unwrap_or_default(),
                        entry.job_rc.clone().unwrap_or_default(),
                        format_optional_size(entry.size_bytes),
                        "View".to_string(),
                    ],
                    action: Some(ViewTarget {
                        kind: EntryKind::Spool,
                        file_name: entry.file_name.clone(),
                        job_name: entry.job_name.clone(),
                        job_id: entry.job_id.clone(),
                    }),
                })
                .collect(),
        )
    };
    TableView {
        title: "Spools",
        columns: SPOOL_COLUMNS,
        filter: None,
        body,
    }
}

pub fn joblog_table(entries: &[JobLogEntry]) -> TableView {
    let body = if entries.is_empty() {
        TableBody::Placeholder("No job logs".to_string())
    } else {
        TableBody::Rows(
            entries
                .iter()
                .map(|entry| RowView {
                    cells: vec![
                        entry.file_name.clone(),
                        entry.job_name.clone().unwrap_or_default(),
                        entry.job_id.clone().unwrap_or_default(),
                        format_optional_size(entry.size_bytes),
                        "View".to_string(),
                    ],
                    action: Some(ViewTarget {
                        kind: EntryKind::JobLog,
                        file_name: entry.file_name.clone(),
                        job_name: entry.job_name.clone(),
                        job_id: entry.job_id.clone(),
                    }),
                })
                .collect(),
        )
    };
    TableView {
        title: "Job logs",
        columns: JOBLOG_COLUMNS,
        filter: None,
        body,
    }
}

pub fn pid_table(entries: &[PidEntry]) -> TableView {
    let body = if entries.is_empty() {
        TableBody::Placeholder("No processes".to_string())
    } else {
        TableBody::Rows(
            entries
                .iter()
                .map(|entry| RowView {
                    cells: vec![
                        entry.name.clone(),
                        entry.content.clone().unwrap_or_else(|| "--".to_string()),
                    ],
                    action: None,
                })
                .collect(),
        )
    };
    TableView {
        title: "Processes",
        columns: PID_COLUMNS,
        filter: None,
        body,
    }
}

fn tracked_table<T>(
    region: &Region<Vec<T>>,
    render: fn(&[T]) -> TableView,
    title: &'static str,
    columns: &'static [&'static str],
) -> TableView {
    let placeholder = |text: String| TableView {
        title,
        columns,
        filter: None,
        body: TableBody::Placeholder(text),
    };
    match region {
        Region::Loaded(entries) => render(entries),
        Region::NotLoaded | Region::Loading => placeholder(LOADING.to_string()),
        Region::Failed(detail) => placeholder(format!("Failed to load: {detail}")),
    }
}

fn with_filter(mut table: TableView, filter: &ListFilter) -> TableView {
    if !filter.is_empty() {
        table.filter = Some(filter.clone());
    }
    table
}

fn log_tail_view(region: &Region<LogTail>, log_name: &str, lines: u32) -> TextView {
    let (name, body) = match region {
        Region::Loaded(tail) if tail.content.is_empty() => (tail.name.as_str(), "(empty)".to_string()),
        Region::Loaded(tail) => (tail.name.as_str(), tail.content.clone()),
        Region::NotLoaded | Region::Loading => (log_name, LOADING.to_string()),
        Region::Failed(detail) => (log_name, format!("Failed to load: {detail}")),
    };
    TextView {
        title: format!("{name} (last {lines} lines)"),
        body,
    }
}

fn modal_view(modal: &ModalState) -> Option<ModalView> {
    let ModalState::Open(open) = modal else {
        return None;
    };
    let (body, body_is_content) = match &open.body {
        ModalBody::Loading => (LOADING.to_string(), false),
        ModalBody::Text(text) => (text.clone(), true),
        ModalBody::TooLarge { size } => (format!("File too large to preview ({size} bytes)"), false),
        ModalBody::Undecodable(detail) => (format!("Cannot display as text: {detail}"), false),
        ModalBody::Failed(detail) => (format!("Failed to load: {detail}"), false),
    };
    let download = open.download.as_ref().map(|link| match link {
        DownloadLink::Blob { file_name, bytes } => {
            format!("Download {file_name} ({})", format_optional_size(Some(bytes.len() as u64)))
        }
        DownloadLink::Raw { file_name, .. } => format!("Download raw {file_name}"),
    });
    Some(ModalView {
        title: open.title.clone(),
        header_lines: open.header_lines.clone(),
        body,
        body_is_content,
        download,
    })
}
