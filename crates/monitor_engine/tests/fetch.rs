use std::time::Duration;

use monitor_engine::{Endpoint, FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(2),
        ..FetchSettings::default()
    })
    .expect("fetcher")
}

#[tokio::test]
async fn spool_list_is_returned_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"file-name": "JOB1.txt", "job-name": "PAYROLL", "size": 10}
        ])))
        .mount(&server)
        .await;

    let value = fetcher_for(&server)
        .fetch_json(&Endpoint::Spools {
            job_name: String::new(),
            job_id: String::new(),
        })
        .await
        .expect("fetch ok");
    assert_eq!(value[0]["job-name"], "PAYROLL");
}

#[tokio::test]
async fn filters_are_sent_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joblogs"))
        .and(query_param("job_name", "PAYROLL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let value = fetcher_for(&server)
        .fetch_json(&Endpoint::JobLogs {
            job_name: "PAYROLL".into(),
            job_id: String::new(),
        })
        .await
        .expect("fetch ok");
    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn http_error_carries_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spools/MISSING.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Spool not found"})))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_bytes(&Endpoint::Spool {
            name: "MISSING.txt".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "Spool not found");
    assert_eq!(err.to_string(), "http status 404: Spool not found");
}

#[tokio::test]
async fn non_json_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pids"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_json(&Endpoint::Pids)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn bytes_keep_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joblogs/JOB2.log"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("IEF142I STEP1 - COND CODE 0000", "text/plain; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetched = fetcher_for(&server)
        .fetch_bytes(&Endpoint::JobLog {
            name: "JOB2.log".into(),
        })
        .await
        .expect("fetch ok");
    assert_eq!(&fetched.bytes[..], b"IEF142I STEP1 - COND CODE 0000");
    assert_eq!(fetched.content_type.as_deref(), Some("text/plain; charset=utf-8"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spools/BIG.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4096]))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        max_bytes: 1024,
        ..FetchSettings::default()
    })
    .expect("fetcher");
    let err = fetcher
        .fetch_bytes(&Endpoint::Spool {
            name: "BIG.txt".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 1024, .. }));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ready": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(200),
        ..FetchSettings::default()
    })
    .expect("fetcher");
    let err = fetcher.fetch_json(&Endpoint::Ready).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let fetcher = ReqwestFetcher::new(FetchSettings {
        base_url: "http://127.0.0.1:9".into(),
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_secs(1),
        ..FetchSettings::default()
    })
    .expect("fetcher");
    let err = fetcher.fetch_json(&Endpoint::Pids).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}
