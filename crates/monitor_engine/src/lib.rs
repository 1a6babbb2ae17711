//! Spool monitor engine: HTTP access to the bridge API, live stream, timers and downloads.
mod decode;
mod endpoint;
mod engine;
mod fetch;
mod persist;
mod preview;
mod refresh;
mod stream;
mod types;

pub use decode::{decode_text, DecodeError, DecodedText};
pub use endpoint::Endpoint;
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use fetch::{ChannelEventSink, EventSink, FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, safe_file_name, AtomicFileWriter, PersistError};
pub use preview::{prepare_preview, Preview, MAX_PREVIEW_BYTES};
pub use refresh::{clamp_interval, AutoRefresh, MAX_REFRESH_INTERVAL, MIN_REFRESH_INTERVAL};
pub use stream::{LiveStream, SseDecoder};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchedBytes, Payload, PreviewOutput, RequestId,
    StreamId,
};
