use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use crate::{DecodeError, Endpoint, Preview};

pub type RequestId = u64;
pub type StreamId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Fetched {
        request: RequestId,
        endpoint: Endpoint,
        result: Result<Payload, FetchError>,
    },
    StreamLine {
        stream: StreamId,
        line: String,
    },
    /// Emitted only when the stream ends on its own; `stop()` is silent.
    StreamClosed {
        stream: StreamId,
        error: Option<FetchError>,
    },
    RefreshTick,
    DownloadSaved {
        file_name: String,
        result: Result<PathBuf, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Preview(PreviewOutput),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBytes {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutput {
    pub bytes: Bytes,
    pub preview: Result<Preview, DecodeError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-2xx response; the message carries the body text.
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Body could not be parsed as the expected JSON.
    Decode,
    /// Live subscription dropped mid-stream.
    Stream,
    /// Request failed before any response arrived.
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Stream => write!(f, "stream error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
