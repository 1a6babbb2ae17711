use crate::entry::{JobLogEntry, JobLogMeta, LogTail, PidEntry, SearchResult, SpoolEntry};
use crate::{ListFilter, ListSection, PreviewPayload, RequestId, StreamId, Tab, ViewTarget};

/// Failures arrive as display text; the host has already logged the typed error.
pub type Fetched<T> = Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Host finished wiring; load the visible section and readiness.
    Started,
    /// User activated a tab.
    TabSelected(Tab),
    /// User asked for a manual reload of the visible section.
    RefreshClicked,
    /// Auto-refresh timer fired.
    RefreshTick,
    /// User flipped the auto-refresh toggle.
    AutoRefreshToggled,
    /// User changed the job name / job id filter of a list.
    FilterChanged {
        section: ListSection,
        filter: ListFilter,
    },
    /// User picked another log file or line count for the log tail.
    LogTargetChanged { name: String, lines: u32 },
    /// User submitted a raw-dump search.
    SearchSubmitted(String),
    /// User clicked "View" on a row.
    ViewRequested(ViewTarget),
    /// User closed the preview (button, backdrop or Escape).
    ModalClosed,
    /// User clicked the preview's download link.
    DownloadClicked,
    StreamStartClicked,
    StreamStopClicked,
    SpoolsLoaded {
        request: RequestId,
        result: Fetched<Vec<SpoolEntry>>,
    },
    JobLogsLoaded {
        request: RequestId,
        result: Fetched<Vec<JobLogEntry>>,
    },
    PidsLoaded {
        request: RequestId,
        result: Fetched<Vec<PidEntry>>,
    },
    LogTailLoaded {
        request: RequestId,
        result: Fetched<LogTail>,
    },
    ReadyChecked {
        request: RequestId,
        result: Fetched<bool>,
    },
    PreviewLoaded {
        request: RequestId,
        result: Fetched<PreviewPayload>,
    },
    JobLogMetaLoaded {
        request: RequestId,
        result: Fetched<JobLogMeta>,
    },
    SearchCompleted {
        request: RequestId,
        result: Fetched<SearchResult>,
    },
    /// Download written; carries the destination path for display.
    DownloadSaved(Fetched<String>),
    /// One message from the live stream.
    StreamLine { stream: StreamId, line: String },
    /// The live stream ended on its own; `error` is set for transport failures.
    StreamClosed {
        stream: StreamId,
        error: Option<String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
