use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use monitor_logging::{monitor_debug, monitor_warn};

use crate::fetch::{ChannelEventSink, EventSink, FetchSettings, Fetcher, ReqwestFetcher};
use crate::persist::{safe_file_name, AtomicFileWriter};
use crate::preview::prepare_preview;
use crate::refresh::AutoRefresh;
use crate::stream::LiveStream;
use crate::{Endpoint, EngineEvent, FetchError, Payload, PreviewOutput, RequestId, StreamId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub downloads_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            downloads_dir: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    FetchJson { request: RequestId, endpoint: Endpoint },
    FetchPreview { request: RequestId, endpoint: Endpoint },
    StartStream { stream: StreamId },
    StopStream,
    EnableAutoRefresh { interval: Duration },
    DisableAutoRefresh,
    SaveDownload { file_name: String, bytes: Bytes },
    DownloadRaw { endpoint: Endpoint, file_name: String },
    Shutdown,
}

/// Owns the IO worker thread; commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch)?);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let writer = Arc::new(AtomicFileWriter::new(config.downloads_dir));

        let worker = thread::spawn(move || {
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let mut live = LiveStream::new(fetcher.clone(), sink.clone(), runtime.handle().clone());
            let mut refresh = AutoRefresh::new(sink.clone(), runtime.handle().clone());

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Shutdown => break,
                    EngineCommand::StartStream { stream } => {
                        live.start(stream);
                    }
                    EngineCommand::StopStream => {
                        live.stop();
                    }
                    EngineCommand::EnableAutoRefresh { interval } => {
                        refresh.enable(interval);
                    }
                    EngineCommand::DisableAutoRefresh => refresh.disable(),
                    command => {
                        let fetcher = fetcher.clone();
                        let sink = sink.clone();
                        let writer = writer.clone();
                        runtime.spawn(async move {
                            handle_command(fetcher.as_ref(), sink.as_ref(), &writer, command).await;
                        });
                    }
                }
            }

            drop(live);
            drop(refresh);
            runtime.shutdown_background();
            monitor_debug!("engine worker stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    pub fn fetch_json(&self, request: RequestId, endpoint: Endpoint) {
        self.send(EngineCommand::FetchJson { request, endpoint });
    }

    pub fn fetch_preview(&self, request: RequestId, endpoint: Endpoint) {
        self.send(EngineCommand::FetchPreview { request, endpoint });
    }

    /// Ignored while a stream is already running.
    pub fn start_stream(&self, stream: StreamId) {
        self.send(EngineCommand::StartStream { stream });
    }

    pub fn stop_stream(&self) {
        self.send(EngineCommand::StopStream);
    }

    pub fn enable_auto_refresh(&self, interval: Duration) {
        self.send(EngineCommand::EnableAutoRefresh { interval });
    }

    pub fn disable_auto_refresh(&self) {
        self.send(EngineCommand::DisableAutoRefresh);
    }

    /// Writes bytes already in memory to the downloads directory.
    pub fn save_download(&self, file_name: impl Into<String>, bytes: Bytes) {
        self.send(EngineCommand::SaveDownload {
            file_name: file_name.into(),
            bytes,
        });
    }

    /// Fetches `endpoint` unprocessed and saves it under `file_name`.
    pub fn download_raw(&self, endpoint: Endpoint, file_name: impl Into<String>) {
        self.send(EngineCommand::DownloadRaw {
            endpoint,
            file_name: file_name.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            monitor_warn!("engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn handle_command(
    fetcher: &dyn Fetcher,
    sink: &dyn EventSink,
    writer: &AtomicFileWriter,
    command: EngineCommand,
) {
    match command {
        EngineCommand::FetchJson { request, endpoint } => {
            let result = fetcher.fetch_json(&endpoint).await.map(Payload::Json);
            log_failure(request, &endpoint, &result);
            sink.emit(EngineEvent::Fetched {
                request,
                endpoint,
                result,
            });
        }
        EngineCommand::FetchPreview { request, endpoint } => {
            let result = fetcher.fetch_bytes(&endpoint).await.map(|fetched| {
                let preview = prepare_preview(&fetched.bytes, fetched.content_type.as_deref());
                Payload::Preview(PreviewOutput {
                    bytes: fetched.bytes,
                    preview,
                })
            });
            log_failure(request, &endpoint, &result);
            sink.emit(EngineEvent::Fetched {
                request,
                endpoint,
                result,
            });
        }
        EngineCommand::SaveDownload { file_name, bytes } => {
            let result = save(writer, &file_name, &bytes);
            sink.emit(EngineEvent::DownloadSaved { file_name, result });
        }
        EngineCommand::DownloadRaw {
            endpoint,
            file_name,
        } => {
            let result = match fetcher.fetch_bytes(&endpoint).await {
                Ok(fetched) => save(writer, &file_name, &fetched.bytes),
                Err(err) => Err(err.to_string()),
            };
            sink.emit(EngineEvent::DownloadSaved { file_name, result });
        }
        EngineCommand::StartStream { .. }
        | EngineCommand::StopStream
        | EngineCommand::EnableAutoRefresh { .. }
        | EngineCommand::DisableAutoRefresh
        | EngineCommand::Shutdown => {}
    }
}

fn save(writer: &AtomicFileWriter, file_name: &str, bytes: &[u8]) -> Result<PathBuf, String> {
    let target = safe_file_name(file_name);
    writer.write(&target, bytes).map_err(|err| {
        monitor_warn!("saving {target} to {} failed: {err}", writer.dir().display());
        err.to_string()
    })
}

fn log_failure(request: RequestId, endpoint: &Endpoint, result: &Result<Payload, FetchError>) {
    match result {
        Ok(_) => monitor_debug!("{} ok", endpoint.describe(request)),
        Err(err) => monitor_warn!("{} failed: {err}", endpoint.describe(request)),
    }
}
