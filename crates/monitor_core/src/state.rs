use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;

use crate::entry::{JobLogEntry, LogTail, PidEntry, SpoolEntry};
use crate::view_model::{self, AppViewModel};

pub type RequestId = u64;
pub type StreamId = u64;

/// Console lines kept before the oldest are dropped.
pub const MAX_CONSOLE_LINES: usize = 5_000;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_NAME: &str = "console_bridge.log";
pub const DEFAULT_LOG_LINES: u32 = 200;
pub const MAX_LOG_LINES: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Spools,
    JobLogs,
    Logs,
    Processes,
    Console,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Spools,
        Tab::JobLogs,
        Tab::Logs,
        Tab::Processes,
        Tab::Console,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Spools => "Spools",
            Tab::JobLogs => "Job logs",
            Tab::Logs => "Logs",
            Tab::Processes => "Processes",
            Tab::Console => "Console",
        }
    }

    /// Accepts the labels plus a few short forms (`joblogs`, `pids`, ...).
    pub fn from_name(name: &str) -> Option<Tab> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "spools" | "spool" => Some(Tab::Spools),
            "joblogs" | "joblog" => Some(Tab::JobLogs),
            "logs" | "log" => Some(Tab::Logs),
            "processes" | "pids" => Some(Tab::Processes),
            "console" | "stream" => Some(Tab::Console),
            _ => None,
        }
    }

    pub fn next(self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Tab::ALL[(idx + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Who asked for a load. Background failures never replace what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSection {
    Spools,
    JobLogs,
}

/// Server-side filters; empty strings are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFilter {
    pub job_name: String,
    pub job_id: String,
}

impl ListFilter {
    pub fn new(job_name: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into().trim().to_string(),
            job_id: job_id.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.job_name.is_empty() && self.job_id.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Spool,
    JobLog,
}

/// Identity bound to a row's "View" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTarget {
    pub kind: EntryKind,
    pub file_name: String,
    pub job_name: Option<String>,
    pub job_id: Option<String>,
}

impl ViewTarget {
    /// `NAME (ID)` when a job name is known, else the file name.
    pub fn title(&self) -> String {
        match (&self.job_name, &self.job_id) {
            (Some(name), Some(id)) => format!("{name} ({id})"),
            (Some(name), None) => name.clone(),
            _ => self.file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region<T> {
    NotLoaded,
    Loading,
    Loaded(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The region now shows this response; carries who asked for it.
    Applied(Origin),
    /// An answer at least as new as this one is already on screen.
    Stale,
    /// Background failure: logged by the host, screen left untouched.
    Suppressed,
}

/// A view region plus the ordering of the requests issued for it.
///
/// Request ids grow monotonically, so any answer newer than the last applied
/// one is shown even if later requests are still in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    value: Region<T>,
    latest: RequestId,
    applied: RequestId,
    /// User requests not yet answered or overtaken, oldest first.
    user_waiting: Vec<RequestId>,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            value: Region::NotLoaded,
            latest: 0,
            applied: 0,
            user_waiting: Vec::new(),
        }
    }
}

impl<T> Tracked<T> {
    pub fn region(&self) -> &Region<T> {
        &self.value
    }

    pub(crate) fn begin(&mut self, request: RequestId, origin: Origin) {
        self.latest = self.latest.max(request);
        if origin == Origin::User {
            self.user_waiting.push(request);
        }
        if matches!(self.value, Region::NotLoaded | Region::Failed(_)) {
            self.value = Region::Loading;
        }
    }

    pub(crate) fn resolve(&mut self, request: RequestId, result: Result<T, String>) -> Resolution {
        if request <= self.applied || request > self.latest {
            return Resolution::Stale;
        }
        self.applied = request;
        // Answering or overtaking a user request counts as answering it.
        let origin = match self.user_waiting.first() {
            Some(oldest) if *oldest <= request => Origin::User,
            _ => Origin::Background,
        };
        self.user_waiting.retain(|waiting| *waiting > request);
        match result {
            Ok(value) => {
                self.value = Region::Loaded(value);
                Resolution::Applied(origin)
            }
            Err(_) if origin == Origin::Background && matches!(self.value, Region::Loaded(_)) => {
                Resolution::Suppressed
            }
            Err(detail) => {
                self.value = Region::Failed(detail);
                Resolution::Applied(origin)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_request(&self) -> Option<RequestId> {
        (self.latest > self.applied).then_some(self.latest)
    }
}

/// What the host made of the fetched preview bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    Text(String),
    TooLarge { size: u64 },
    Undecodable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPayload {
    pub body: PreviewBody,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalBody {
    Loading,
    Text(String),
    TooLarge { size: u64 },
    /// Bytes arrived but could not be shown as text.
    Undecodable(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadLink {
    /// Bytes already fetched for the preview.
    Blob { file_name: String, bytes: Bytes },
    /// Direct fetch of the resource, offered when the preview fetch failed.
    Raw { kind: EntryKind, file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenModal {
    pub(crate) request: RequestId,
    pub(crate) meta_request: Option<RequestId>,
    pub target: ViewTarget,
    pub title: String,
    pub header_lines: Vec<String>,
    pub body: ModalBody,
    pub download: Option<DownloadLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open(OpenModal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Idle,
    Live { stream: StreamId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingSearch {
    pub(crate) request: RequestId,
    pub(crate) query: String,
}

/// Startup options coming from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    pub initial_tab: Option<Tab>,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    pub log_name: String,
    pub log_lines: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            initial_tab: None,
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_name: DEFAULT_LOG_NAME.to_string(),
            log_lines: DEFAULT_LOG_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) active_tab: Tab,
    pub(crate) spools: Tracked<Vec<SpoolEntry>>,
    pub(crate) spool_filter: ListFilter,
    pub(crate) joblogs: Tracked<Vec<JobLogEntry>>,
    pub(crate) joblog_filter: ListFilter,
    pub(crate) pids: Tracked<Vec<PidEntry>>,
    pub(crate) log_tail: Tracked<LogTail>,
    pub(crate) log_name: String,
    pub(crate) log_lines: u32,
    pub(crate) ready: Tracked<bool>,
    pub(crate) modal: ModalState,
    pub(crate) console: VecDeque<String>,
    pub(crate) stream: StreamStatus,
    pub(crate) auto_refresh: bool,
    pub(crate) refresh_interval: Duration,
    pub(crate) search: Option<PendingSearch>,
    pub(crate) status: Option<StatusMessage>,
    next_id: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_options(DashboardOptions::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DashboardOptions) -> Self {
        Self {
            active_tab: options.initial_tab.unwrap_or(Tab::ALL[0]),
            spools: Tracked::default(),
            spool_filter: ListFilter::default(),
            joblogs: Tracked::default(),
            joblog_filter: ListFilter::default(),
            pids: Tracked::default(),
            log_tail: Tracked::default(),
            log_name: options.log_name,
            log_lines: options.log_lines.clamp(1, MAX_LOG_LINES),
            ready: Tracked::default(),
            modal: ModalState::Closed,
            console: VecDeque::new(),
            stream: StreamStatus::Idle,
            auto_refresh: options.auto_refresh,
            refresh_interval: options.refresh_interval,
            search: None,
            status: None,
            next_id: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.stream
    }

    pub fn is_auto_refresh_enabled(&self) -> bool {
        self.auto_refresh
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_request(&mut self) -> RequestId {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn set_status(&mut self, severity: Severity, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            severity,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn push_console_line(&mut self, line: String) {
        self.console.push_back(line);
        while self.console.len() > MAX_CONSOLE_LINES {
            self.console.pop_front();
        }
        self.dirty = true;
    }
}
