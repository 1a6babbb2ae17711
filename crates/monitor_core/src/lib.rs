//! Monitor core: pure dashboard state machine and view-model helpers.
mod effect;
mod entry;
mod format;
mod markup;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use entry::{
    normalize_joblog_meta, normalize_joblogs, normalize_log_tail, normalize_pids,
    normalize_ready, normalize_search, normalize_spools, EntryShapeError, JobLogEntry, JobLogMeta,
    LogTail, PidEntry, SearchResult, SpoolEntry,
};
pub use format::{escape_html, format_optional_size, format_size};
pub use markup::{render_page, render_table};
pub use msg::{Fetched, Msg};
pub use state::{
    AppState, DashboardOptions, DownloadLink, EntryKind, ListFilter, ListSection, ModalBody,
    ModalState, OpenModal, Origin, PreviewBody, PreviewPayload, Region, RequestId, Severity,
    StatusMessage, StreamId, StreamStatus, Tab, Tracked, ViewTarget, DEFAULT_LOG_LINES,
    DEFAULT_LOG_NAME, DEFAULT_REFRESH_INTERVAL, MAX_CONSOLE_LINES,
};
pub use update::update;
pub use view_model::{
    joblog_table, pid_table, spool_table, AppViewModel, ConsoleView, ModalView, ReadyView,
    RowView, SectionView, TabView, TableBody, TableView, TextView,
};
