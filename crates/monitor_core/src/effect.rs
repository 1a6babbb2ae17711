use std::time::Duration;

use bytes::Bytes;

use crate::{EntryKind, ListFilter, RequestId, StreamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadSpools { request: RequestId, filter: ListFilter },
    LoadJobLogs { request: RequestId, filter: ListFilter },
    LoadPids { request: RequestId },
    LoadLogTail { request: RequestId, name: String, lines: u32 },
    CheckReady { request: RequestId },
    LoadPreview { request: RequestId, kind: EntryKind, file_name: String },
    LoadJobLogMeta { request: RequestId, file_name: String },
    Search { request: RequestId, query: String },
    SaveDownload { file_name: String, bytes: Bytes },
    DownloadRaw { kind: EntryKind, file_name: String },
    StartStream { stream: StreamId },
    StopStream,
    EnableAutoRefresh { interval: Duration },
    DisableAutoRefresh,
}
