use std::sync::{mpsc, Arc};
use std::time::Duration;

use monitor_engine::{
    ChannelEventSink, EngineConfig, EngineEvent, EngineHandle, EventSink, FailureKind,
    FetchSettings, LiveStream, ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::runtime::Handle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_stream(server: &MockServer) -> (LiveStream, mpsc::Receiver<EngineEvent>) {
    let fetcher = ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        ..FetchSettings::default()
    })
    .expect("fetcher");
    let (tx, rx) = mpsc::channel();
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(tx));
    (LiveStream::new(Arc::new(fetcher), sink, Handle::current()), rx)
}

async fn collect_until_closed(rx: &mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    for _ in 0..200 {
        while let Ok(event) = rx.try_recv() {
            let closed = matches!(event, EngineEvent::StreamClosed { .. });
            events.push(event);
            if closed {
                return events;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("stream never closed; got {events:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn lines_arrive_in_order_then_clean_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: IEF403I PAYROLL STARTED\n\n: keepalive\n\ndata: IEF404I PAYROLL ENDED\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let (mut live, rx) = live_stream(&server);
    assert!(live.start(7));
    let events = collect_until_closed(&rx).await;

    assert_eq!(
        events,
        vec![
            EngineEvent::StreamLine {
                stream: 7,
                line: "IEF403I PAYROLL STARTED".into()
            },
            EngineEvent::StreamLine {
                stream: 7,
                line: "IEF404I PAYROLL ENDED".into()
            },
            EngineEvent::StreamClosed {
                stream: 7,
                error: None
            },
        ]
    );
    assert!(!live.is_active());
}

#[tokio::test(flavor = "multi_thread")]
async fn http_failure_closes_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (mut live, rx) = live_stream(&server);
    live.start(1);
    let events = collect_until_closed(&rx).await;
    match events.last() {
        Some(EngineEvent::StreamClosed {
            stream: 1,
            error: Some(err),
        }) => assert_eq!(err.kind, FailureKind::HttpStatus(503)),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn second_start_is_ignored_and_stop_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: late\n\n", "text/event-stream")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let (mut live, rx) = live_stream(&server);
    assert!(live.start(1));
    assert!(!live.start(2));
    assert!(live.is_active());

    assert!(live.stop());
    assert!(!live.is_active());
    assert!(!live.stop());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn restart_after_natural_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("data: one\n\n", "text/event-stream"))
        .mount(&server)
        .await;

    let (mut live, rx) = live_stream(&server);
    live.start(1);
    collect_until_closed(&rx).await;
    assert!(live.start(2));
    let events = collect_until_closed(&rx).await;
    assert_eq!(
        events.first(),
        Some(&EngineEvent::StreamLine {
            stream: 2,
            line: "one".into()
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_stop_then_start_delivers_lines_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: never\n\n", "text/event-stream")
                .set_delay(Duration::from_secs(30)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stream/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: IEF403I BACKUP STARTED\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(EngineConfig {
        fetch: FetchSettings {
            base_url: server.uri(),
            ..FetchSettings::default()
        },
        downloads_dir: temp.path().join("downloads"),
    })
    .expect("engine");

    engine.start_stream(1);
    for _ in 0..200 {
        let seen = server.received_requests().await.map_or(0, |requests| requests.len());
        if seen >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    engine.stop_stream();
    engine.start_stream(2);

    let mut events = Vec::new();
    for _ in 0..100 {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            let closed = matches!(event, EngineEvent::StreamClosed { .. });
            events.push(event);
            if closed {
                break;
            }
        }
    }
    assert_eq!(
        events,
        vec![
            EngineEvent::StreamLine {
                stream: 2,
                line: "IEF403I BACKUP STARTED".into()
            },
            EngineEvent::StreamClosed {
                stream: 2,
                error: None
            },
        ]
    );
}
