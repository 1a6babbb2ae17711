use std::sync::Arc;

use futures_util::StreamExt;
use monitor_logging::{monitor_debug, monitor_info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fetch::{EventSink, ReqwestFetcher};
use crate::{Endpoint, EngineEvent, FailureKind, FetchError, StreamId};

/// Incremental `text/event-stream` parser yielding the data of each dispatched event.
///
/// Bytes are buffered until a full line arrives, so multi-byte characters may
/// straddle chunk boundaries. Only `data` fields are kept; `event`, `id`,
/// `retry` and comment lines are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Option<String>,
    /// Last chunk ended on `\r`; a leading `\n` in the next one belongs to it.
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        let mut chunk = chunk;
        if self.after_cr {
            self.after_cr = false;
            if let Some(rest) = chunk.strip_prefix(b"\n") {
                chunk = rest;
            }
        }
        let mut start = 0;
        let mut idx = 0;
        while idx < chunk.len() {
            match chunk[idx] {
                b'\n' | b'\r' => {
                    self.pending.extend_from_slice(&chunk[start..idx]);
                    let line = std::mem::take(&mut self.pending);
                    self.process_line(&line, &mut events);
                    if chunk[idx] == b'\r' {
                        if idx + 1 == chunk.len() {
                            self.after_cr = true;
                        } else if chunk[idx + 1] == b'\n' {
                            idx += 1;
                        }
                    }
                    start = idx + 1;
                }
                _ => {}
            }
            idx += 1;
        }
        self.pending.extend_from_slice(&chunk[start..]);
        events
    }

    /// Flushes an event left undispatched when the body ends without a blank line.
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.process_line(&line, &mut events);
        }
        events.extend(self.data.take());
        events
    }

    fn process_line(&mut self, line: &[u8], events: &mut Vec<String>) {
        if line.is_empty() {
            events.extend(self.data.take());
            return;
        }
        if line[0] == b':' {
            return;
        }
        let line = String::from_utf8_lossy(line);
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };
        if field != "data" {
            return;
        }
        match &mut self.data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => self.data = Some(value.to_string()),
        }
    }
}

struct Subscription {
    stream: StreamId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// At most one live subscription to the event stream.
///
/// `stop` is silent; [`EngineEvent::StreamClosed`] is only emitted when the
/// server ends the stream or the transport fails.
pub struct LiveStream {
    fetcher: Arc<ReqwestFetcher>,
    sink: Arc<dyn EventSink>,
    runtime: Handle,
    active: Option<Subscription>,
}

impl LiveStream {
    pub fn new(fetcher: Arc<ReqwestFetcher>, sink: Arc<dyn EventSink>, runtime: Handle) -> Self {
        Self {
            fetcher,
            sink,
            runtime,
            active: None,
        }
    }

    /// Returns `false` without side effects when a subscription is already running.
    pub fn start(&mut self, stream: StreamId) -> bool {
        if self.is_active() {
            return false;
        }
        let token = CancellationToken::new();
        let task = self.runtime.spawn(run_subscription(
            self.fetcher.clone(),
            self.sink.clone(),
            stream,
            token.clone(),
        ));
        monitor_info!("live stream #{stream} starting");
        self.active = Some(Subscription {
            stream,
            token,
            task,
        });
        true
    }

    /// Returns whether a running subscription was torn down.
    pub fn stop(&mut self) -> bool {
        let Some(subscription) = self.active.take() else {
            return false;
        };
        let was_running = !subscription.token.is_cancelled();
        subscription.token.cancel();
        subscription.task.abort();
        if was_running {
            monitor_info!("live stream #{} stopped", subscription.stream);
        }
        was_running
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|subscription| !subscription.token.is_cancelled())
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_subscription(
    fetcher: Arc<ReqwestFetcher>,
    sink: Arc<dyn EventSink>,
    stream: StreamId,
    token: CancellationToken,
) {
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        outcome = pump(&fetcher, sink.as_ref(), stream) => outcome,
    };
    token.cancel();
    match &outcome {
        Ok(()) => monitor_debug!("live stream #{stream} ended by server"),
        Err(err) => monitor_info!("live stream #{stream} closed: {err}"),
    }
    sink.emit(EngineEvent::StreamClosed {
        stream,
        error: outcome.err(),
    });
}

async fn pump(fetcher: &ReqwestFetcher, sink: &dyn EventSink, stream: StreamId) -> Result<(), FetchError> {
    let response = fetcher.open_stream(&Endpoint::StreamWatch).await?;
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|err| FetchError::new(FailureKind::Stream, err.to_string()))?;
        for line in decoder.feed(&chunk) {
            sink.emit(EngineEvent::StreamLine { stream, line });
        }
    }
    for line in decoder.finish() {
        sink.emit(EngineEvent::StreamLine { stream, line });
    }
    Ok(())
}
