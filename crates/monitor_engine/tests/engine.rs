use std::fs;
use std::time::{Duration, Instant};

use bytes::Bytes;
use monitor_engine::{
    EngineConfig, EngineEvent, EngineHandle, Endpoint, FetchSettings, Payload, Preview,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server: &MockServer, downloads: &TempDir) -> EngineHandle {
    EngineHandle::new(EngineConfig {
        fetch: FetchSettings {
            base_url: server.uri(),
            ..FetchSettings::default()
        },
        downloads_dir: downloads.path().join("downloads"),
    })
    .expect("engine")
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            return event;
        }
    }
    panic!("no engine event within 5s");
}

#[tokio::test(flavor = "multi_thread")]
async fn json_fetch_reports_request_and_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ready": true})))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine(&server, &temp);

    engine.fetch_json(41, Endpoint::Ready);
    assert_eq!(
        next_event(&engine),
        EngineEvent::Fetched {
            request: 41,
            endpoint: Endpoint::Ready,
            result: Ok(Payload::Json(json!({"ready": true}))),
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn preview_fetch_decodes_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spools/JOB1.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello spool", "text/plain"))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine(&server, &temp);

    engine.fetch_preview(
        3,
        Endpoint::Spool {
            name: "JOB1.txt".into(),
        },
    );
    match next_event(&engine) {
        EngineEvent::Fetched {
            request: 3,
            result: Ok(Payload::Preview(output)),
            ..
        } => {
            assert_eq!(&output.bytes[..], b"hello spool");
            match output.preview {
                Ok(Preview::Text(decoded)) => assert_eq!(decoded.text, "hello spool"),
                other => panic!("unexpected preview {other:?}"),
            }
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn save_download_writes_sanitized_name() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let engine = engine(&server, &temp);

    engine.save_download("../JOB1.txt", Bytes::from_static(b"contents"));
    match next_event(&engine) {
        EngineEvent::DownloadSaved {
            file_name,
            result: Ok(saved),
        } => {
            assert_eq!(file_name, "../JOB1.txt");
            assert_eq!(saved, temp.path().join("downloads").join("JOB1.txt"));
            assert_eq!(fs::read(&saved).unwrap(), b"contents");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_download_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joblogs/GONE.log"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Joblog not found"})))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine(&server, &temp);

    engine.download_raw(
        Endpoint::JobLog {
            name: "GONE.log".into(),
        },
        "GONE.log",
    );
    match next_event(&engine) {
        EngineEvent::DownloadSaved {
            result: Err(detail),
            ..
        } => assert_eq!(detail, "http status 404: Joblog not found"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn invalid_base_url_fails_to_start() {
    let result = EngineHandle::new(EngineConfig {
        fetch: FetchSettings {
            base_url: "::nope::".into(),
            ..FetchSettings::default()
        },
        ..EngineConfig::default()
    });
    assert!(result.is_err());
}
