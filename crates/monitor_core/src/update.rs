use crate::entry::JobLogMeta;
use crate::format::format_optional_size;
use crate::state::{PendingSearch, Resolution, MAX_LOG_LINES};
use crate::{
    AppState, DownloadLink, Effect, EntryKind, ListSection, ModalBody, ModalState, Msg, OpenModal,
    Origin, PreviewBody, Severity, StreamStatus, Tab, Tracked,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            let mut effects = load_visible(&mut state, Origin::User);
            effects.push(check_ready(&mut state, Origin::User));
            if state.auto_refresh {
                effects.push(Effect::EnableAutoRefresh {
                    interval: state.refresh_interval,
                });
            }
            state.mark_dirty();
            effects
        }
        Msg::TabSelected(tab) => {
            state.active_tab = tab;
            state.mark_dirty();
            load_visible(&mut state, Origin::User)
        }
        Msg::RefreshClicked => {
            let mut effects = load_visible(&mut state, Origin::User);
            effects.push(check_ready(&mut state, Origin::User));
            effects
        }
        Msg::RefreshTick => {
            // A tick can still be in flight after the toggle was switched off.
            if !state.auto_refresh {
                return (state, Vec::new());
            }
            let mut effects = load_visible(&mut state, Origin::Background);
            effects.push(check_ready(&mut state, Origin::Background));
            effects
        }
        Msg::AutoRefreshToggled => {
            state.auto_refresh = !state.auto_refresh;
            if state.auto_refresh {
                let interval = state.refresh_interval;
                state.set_status(
                    Severity::Info,
                    format!("Auto-refresh on (every {}s)", interval.as_secs()),
                );
                vec![Effect::EnableAutoRefresh { interval }]
            } else {
                state.set_status(Severity::Info, "Auto-refresh off");
                vec![Effect::DisableAutoRefresh]
            }
        }
        Msg::FilterChanged { section, filter } => {
            let (slot, tab) = match section {
                ListSection::Spools => (&mut state.spool_filter, Tab::Spools),
                ListSection::JobLogs => (&mut state.joblog_filter, Tab::JobLogs),
            };
            let changed = *slot != filter;
            *slot = filter;
            if !changed {
                return (state, Vec::new());
            }
            state.mark_dirty();
            if state.active_tab == tab {
                load_visible(&mut state, Origin::User)
            } else {
                Vec::new()
            }
        }
        Msg::LogTargetChanged { name, lines } => {
            let name = name.trim();
            if name.is_empty() {
                state.set_status(Severity::Warning, "Enter a log file name");
                return (state, Vec::new());
            }
            state.log_name = name.to_string();
            state.log_lines = lines.clamp(1, MAX_LOG_LINES);
            state.mark_dirty();
            if state.active_tab == Tab::Logs {
                load_visible(&mut state, Origin::User)
            } else {
                Vec::new()
            }
        }
        Msg::SearchSubmitted(raw) => {
            let query = raw.trim().to_string();
            if query.is_empty() {
                state.set_status(Severity::Warning, "Enter a search term");
                return (state, Vec::new());
            }
            let request = state.next_request();
            state.search = Some(PendingSearch {
                request,
                query: query.clone(),
            });
            state.set_status(Severity::Info, format!("Searching raw dump for '{query}'..."));
            vec![Effect::Search { request, query }]
        }
        Msg::SearchCompleted { request, result } => {
            let query = match state.search.take() {
                Some(pending) if pending.request == request => pending.query,
                other => {
                    state.search = other;
                    return (state, Vec::new());
                }
            };
            match result {
                Ok(found) if found.found => {
                    state.set_status(Severity::Info, format!("'{}' found in raw dump", found.query))
                }
                Ok(found) => state.set_status(
                    Severity::Info,
                    format!("'{}' not found in raw dump", found.query),
                ),
                Err(detail) => {
                    state.set_status(Severity::Error, format!("Search for '{query}' failed: {detail}"))
                }
            }
            Vec::new()
        }
        Msg::ViewRequested(target) => {
            let request = state.next_request();
            let mut effects = vec![Effect::LoadPreview {
                request,
                kind: target.kind,
                file_name: target.file_name.clone(),
            }];
            let meta_request = if target.kind == EntryKind::JobLog {
                let meta_request = state.next_request();
                effects.push(Effect::LoadJobLogMeta {
                    request: meta_request,
                    file_name: target.file_name.clone(),
                });
                Some(meta_request)
            } else {
                None
            };
            // Reopening while open replaces the content in place.
            state.modal = ModalState::Open(OpenModal {
                request,
                meta_request,
                title: target.title(),
                target,
                header_lines: Vec::new(),
                body: ModalBody::Loading,
                download: None,
            });
            state.mark_dirty();
            effects
        }
        Msg::PreviewLoaded { request, result } => {
            if let ModalState::Open(modal) = &mut state.modal {
                if modal.request == request {
                    match result {
                        Ok(payload) => {
                            modal.body = match payload.body {
                                PreviewBody::Text(text) => ModalBody::Text(text),
                                PreviewBody::TooLarge { size } => ModalBody::TooLarge { size },
                                PreviewBody::Undecodable(detail) => ModalBody::Undecodable(detail),
                            };
                            modal.download = Some(DownloadLink::Blob {
                                file_name: modal.target.file_name.clone(),
                                bytes: payload.bytes,
                            });
                        }
                        Err(detail) => {
                            modal.body = ModalBody::Failed(detail);
                            modal.download = Some(DownloadLink::Raw {
                                kind: modal.target.kind,
                                file_name: modal.target.file_name.clone(),
                            });
                        }
                    }
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::JobLogMetaLoaded { request, result } => {
            if let ModalState::Open(modal) = &mut state.modal {
                if modal.meta_request == Some(request) {
                    modal.header_lines = match result {
                        Ok(meta) => meta_header_lines(&meta),
                        Err(detail) => vec![format!("Metadata unavailable: {detail}")],
                    };
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::ModalClosed => {
            if state.modal != ModalState::Closed {
                state.modal = ModalState::Closed;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DownloadClicked => {
            let link = match &state.modal {
                ModalState::Open(modal) => Some(modal.download.clone()),
                ModalState::Closed => None,
            };
            let Some(link) = link else {
                return (state, Vec::new());
            };
            match link {
                Some(DownloadLink::Blob { file_name, bytes }) => {
                    vec![Effect::SaveDownload { file_name, bytes }]
                }
                Some(DownloadLink::Raw { kind, file_name }) => {
                    vec![Effect::DownloadRaw { kind, file_name }]
                }
                None => {
                    state.set_status(Severity::Warning, "Nothing to download yet");
                    Vec::new()
                }
            }
        }
        Msg::DownloadSaved(result) => {
            match result {
                Ok(path) => state.set_status(Severity::Info, format!("Saved to {path}")),
                Err(detail) => state.set_status(Severity::Error, format!("Download failed: {detail}")),
            }
            Vec::new()
        }
        Msg::StreamStartClicked => match state.stream {
            StreamStatus::Live { .. } => Vec::new(),
            StreamStatus::Idle => {
                let stream = state.next_request();
                state.stream = StreamStatus::Live { stream };
                state.set_status(Severity::Info, "Live stream started");
                vec![Effect::StartStream { stream }]
            }
        },
        Msg::StreamStopClicked => match state.stream {
            StreamStatus::Idle => Vec::new(),
            StreamStatus::Live { .. } => {
                state.stream = StreamStatus::Idle;
                state.set_status(Severity::Info, "Live stream stopped");
                vec![Effect::StopStream]
            }
        },
        Msg::StreamLine { stream, line } => {
            if state.stream == (StreamStatus::Live { stream }) {
                state.push_console_line(line);
            }
            Vec::new()
        }
        Msg::StreamClosed { stream, error } => {
            if state.stream == (StreamStatus::Live { stream }) {
                state.stream = StreamStatus::Idle;
                match error {
                    Some(detail) => {
                        state.set_status(Severity::Warning, format!("Live stream closed: {detail}"))
                    }
                    None => state.set_status(Severity::Info, "Live stream ended"),
                }
            }
            Vec::new()
        }
        Msg::SpoolsLoaded { request, result } => {
            settle(&mut state, |s| &mut s.spools, request, result);
            Vec::new()
        }
        Msg::JobLogsLoaded { request, result } => {
            settle(&mut state, |s| &mut s.joblogs, request, result);
            Vec::new()
        }
        Msg::PidsLoaded { request, result } => {
            settle(&mut state, |s| &mut s.pids, request, result);
            Vec::new()
        }
        Msg::LogTailLoaded { request, result } => {
            settle(&mut state, |s| &mut s.log_tail, request, result);
            Vec::new()
        }
        Msg::ReadyChecked { request, result } => {
            settle(&mut state, |s| &mut s.ready, request, result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Effects that (re)load whatever the active tab shows.
fn load_visible(state: &mut AppState, origin: Origin) -> Vec<Effect> {
    match state.active_tab {
        Tab::Spools => {
            let request = state.next_request();
            state.spools.begin(request, origin);
            vec![Effect::LoadSpools {
                request,
                filter: state.spool_filter.clone(),
            }]
        }
        Tab::JobLogs => {
            let request = state.next_request();
            state.joblogs.begin(request, origin);
            vec![Effect::LoadJobLogs {
                request,
                filter: state.joblog_filter.clone(),
            }]
        }
        Tab::Logs => {
            let request = state.next_request();
            state.log_tail.begin(request, origin);
            vec![Effect::LoadLogTail {
                request,
                name: state.log_name.clone(),
                lines: state.log_lines,
            }]
        }
        Tab::Processes => {
            let request = state.next_request();
            state.pids.begin(request, origin);
            vec![Effect::LoadPids { request }]
        }
        Tab::Console => Vec::new(),
    }
}

fn check_ready(state: &mut AppState, origin: Origin) -> Effect {
    let request = state.next_request();
    state.ready.begin(request, origin);
    Effect::CheckReady { request }
}

fn settle<T>(
    state: &mut AppState,
    region: impl FnOnce(&mut AppState) -> &mut Tracked<T>,
    request: u64,
    result: Result<T, String>,
) {
    let failure = result.as_ref().err().cloned();
    match region(state).resolve(request, result) {
        Resolution::Applied(origin) => {
            // Background failures only show in the region itself.
            if let (Some(detail), Origin::User) = (failure, origin) {
                state.set_status(Severity::Error, format!("Failed to load: {detail}"));
            }
            state.mark_dirty();
        }
        Resolution::Stale | Resolution::Suppressed => {}
    }
}

fn meta_header_lines(meta: &JobLogMeta) -> Vec<String> {
    let mut lines = vec![format!(
        "{} · {}",
        meta.name,
        format_optional_size(meta.size_bytes)
    )];
    if let Some(name) = &meta.job_name {
        let job = match &meta.job_id {
            Some(id) => format!("Job: {name} ({id})"),
            None => format!("Job: {name}"),
        };
        lines.push(job);
    }
    lines.extend(meta.head_lines.iter().cloned());
    lines
}
