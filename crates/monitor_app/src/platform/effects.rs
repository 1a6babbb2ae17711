use std::time::Duration;

use monitor_core::{
    normalize_joblog_meta, normalize_joblogs, normalize_log_tail, normalize_pids, normalize_ready,
    normalize_search, normalize_spools, Effect, EntryKind, Fetched, Msg, PreviewBody,
    PreviewPayload,
};
use monitor_engine::{Endpoint, EngineEvent, EngineHandle, FetchError, Payload, Preview, PreviewOutput};
use monitor_logging::{monitor_debug, monitor_info, monitor_warn};
use serde_json::Value;

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            monitor_debug!("effect {effect:?}");
            match effect {
                Effect::LoadSpools { request, filter } => self.engine.fetch_json(
                    request,
                    Endpoint::Spools {
                        job_name: filter.job_name,
                        job_id: filter.job_id,
                    },
                ),
                Effect::LoadJobLogs { request, filter } => self.engine.fetch_json(
                    request,
                    Endpoint::JobLogs {
                        job_name: filter.job_name,
                        job_id: filter.job_id,
                    },
                ),
                Effect::LoadPids { request } => self.engine.fetch_json(request, Endpoint::Pids),
                Effect::LoadLogTail {
                    request,
                    name,
                    lines,
                } => self
                    .engine
                    .fetch_json(request, Endpoint::LogTail { name, lines }),
                Effect::CheckReady { request } => self.engine.fetch_json(request, Endpoint::Ready),
                Effect::LoadPreview {
                    request,
                    kind,
                    file_name,
                } => self.engine.fetch_preview(request, file_endpoint(kind, file_name)),
                Effect::LoadJobLogMeta { request, file_name } => self
                    .engine
                    .fetch_json(request, Endpoint::JobLogMeta { name: file_name }),
                Effect::Search { request, query } => self
                    .engine
                    .fetch_json(request, Endpoint::RawSearch { query }),
                Effect::SaveDownload { file_name, bytes } => {
                    self.engine.save_download(file_name, bytes)
                }
                Effect::DownloadRaw { kind, file_name } => {
                    let endpoint = file_endpoint(kind, file_name.clone());
                    self.engine.download_raw(endpoint, file_name)
                }
                Effect::StartStream { stream } => self.engine.start_stream(stream),
                Effect::StopStream => self.engine.stop_stream(),
                Effect::EnableAutoRefresh { interval } => {
                    monitor_info!("auto-refresh enabled every {}s", interval.as_secs());
                    self.engine.enable_auto_refresh(interval)
                }
                Effect::DisableAutoRefresh => {
                    monitor_info!("auto-refresh disabled");
                    self.engine.disable_auto_refresh()
                }
            }
        }
    }

    /// Drains every event that is already waiting.
    pub fn poll(&self) -> Vec<Msg> {
        let mut messages = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            messages.push(translate(event));
        }
        messages
    }

    /// Blocks up to `timeout` for a single event.
    pub fn wait(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(translate)
    }
}

fn file_endpoint(kind: EntryKind, name: String) -> Endpoint {
    match kind {
        EntryKind::Spool => Endpoint::Spool { name },
        EntryKind::JobLog => Endpoint::JobLog { name },
    }
}

/// Normalizes payloads at ingestion; the core only ever sees typed entries.
fn translate(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Fetched {
            request,
            endpoint,
            result,
        } => translate_fetch(request, endpoint, result),
        EngineEvent::StreamLine { stream, line } => Msg::StreamLine { stream, line },
        EngineEvent::StreamClosed { stream, error } => Msg::StreamClosed {
            stream,
            error: error.map(|err| err.to_string()),
        },
        EngineEvent::RefreshTick => Msg::RefreshTick,
        EngineEvent::DownloadSaved { file_name, result } => {
            match &result {
                Ok(path) => monitor_info!("saved {file_name} to {}", path.display()),
                Err(detail) => monitor_warn!("download of {file_name} failed: {detail}"),
            }
            Msg::DownloadSaved(result.map(|path| path.display().to_string()))
        }
    }
}

fn translate_fetch(request: u64, endpoint: Endpoint, result: Result<Payload, FetchError>) -> Msg {
    match endpoint {
        Endpoint::Spools { .. } => Msg::SpoolsLoaded {
            request,
            result: json(result, normalize_spools),
        },
        Endpoint::JobLogs { .. } => Msg::JobLogsLoaded {
            request,
            result: json(result, normalize_joblogs),
        },
        Endpoint::Pids => Msg::PidsLoaded {
            request,
            result: json(result, normalize_pids),
        },
        Endpoint::LogTail { name, .. } => Msg::LogTailLoaded {
            request,
            result: json(result, |value| normalize_log_tail(&name, value)),
        },
        Endpoint::Ready => Msg::ReadyChecked {
            request,
            result: json(result, normalize_ready),
        },
        Endpoint::JobLogMeta { .. } => Msg::JobLogMetaLoaded {
            request,
            result: json(result, normalize_joblog_meta),
        },
        Endpoint::RawSearch { query } => Msg::SearchCompleted {
            request,
            result: json(result, |value| normalize_search(&query, value)),
        },
        Endpoint::Spool { .. } | Endpoint::JobLog { .. } => Msg::PreviewLoaded {
            request,
            result: match result {
                Ok(Payload::Preview(output)) => Ok(preview_payload(output)),
                Ok(Payload::Json(_)) => Err("unexpected JSON body for a file".to_string()),
                Err(err) => Err(err.to_string()),
            },
        },
        Endpoint::StreamWatch => Msg::NoOp,
    }
}

fn json<T, E: std::fmt::Display>(
    result: Result<Payload, FetchError>,
    normalize: impl FnOnce(&Value) -> Result<T, E>,
) -> Fetched<T> {
    match result {
        Ok(Payload::Json(value)) => normalize(&value).map_err(|err| {
            monitor_warn!("unexpected response shape: {err}");
            err.to_string()
        }),
        Ok(Payload::Preview(_)) => Err("expected a JSON body".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn preview_payload(output: PreviewOutput) -> PreviewPayload {
    let body = match output.preview {
        Ok(Preview::Text(decoded)) => PreviewBody::Text(decoded.text),
        Ok(Preview::TooLarge { size }) => PreviewBody::TooLarge { size: size as u64 },
        Err(err) => PreviewBody::Undecodable(err.to_string()),
    };
    PreviewPayload {
        body,
        bytes: output.bytes,
    }
}
