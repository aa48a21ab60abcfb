//! HTTP tests against a mock ruleset server.
//!
//! The fetcher is blocking, so every call runs on a blocking thread while
//! the mock server is driven by the async runtime.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::time::Duration;

use etupdate_core::Fetcher;
use etupdate_core::HashAlgorithm;
use etupdate_core::HttpFetcher;
use etupdate_core::NoopObserver;
use etupdate_core::UpdateError;
use etupdate_core::Updater;
use etupdate_core::UpdaterConfig;
use etupdate_core::config::USER_AGENT;
use etupdate_core::integrity::hash_bytes;
use etupdate_core::test_utils::TarTestBuilder;
use tempfile::TempDir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(USER_AGENT, Duration::from_secs(5)).expect("failed to build client")
}

async fn mock_body(server: &MockServer, route: &str, body: impl AsRef<[u8]>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_ref()))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("9431\n"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/version.txt", server.uri());
    let body = tokio::task::spawn_blocking(move || fetcher().fetch_text(&url))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(body, "9431\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/version.txt", server.uri());
    let result = tokio::task::spawn_blocking(move || fetcher().fetch(&url))
        .await
        .unwrap();

    match result {
        Err(UpdateError::Network { reason, .. }) => assert!(reason.contains("404")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_streams_body() {
    let server = MockServer::start().await;
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    mock_body(&server, "/emerging.rules.tar.gz", &payload).await;

    let url = format!("{}/emerging.rules.tar.gz", server.uri());
    let (written, sink) = tokio::task::spawn_blocking(move || {
        let mut sink = Vec::new();
        let written = fetcher().download(&url, &mut sink).unwrap();
        (written, sink)
    })
    .await
    .unwrap();

    assert_eq!(written, payload.len() as u64);
    assert_eq!(sink, payload);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("1")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/version.txt", server.uri());
    let result = tokio::task::spawn_blocking(move || {
        HttpFetcher::new(USER_AGENT, Duration::from_millis(200))
            .unwrap()
            .fetch(&url)
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(UpdateError::Network { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_update_over_http() {
    let server = MockServer::start().await;
    let archive = TarTestBuilder::new()
        .add_directory("rules/")
        .add_file("rules/emerging-scan.rules", b"alert tcp any any -> any 22 (sid:3;)")
        .build_gz();
    mock_body(&server, "/version.txt", "12\n").await;
    mock_body(
        &server,
        "/emerging.rules.tar.gz.md5",
        format!("{}\n", hash_bytes(&archive, HashAlgorithm::Md5)),
    )
    .await;
    mock_body(&server, "/emerging.rules.tar.gz", &archive).await;

    let temp = TempDir::new().unwrap();
    let config = UpdaterConfig::from_url_root(&server.uri(), temp.path());
    let version_file = config.version_file.clone();

    let report = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::from_config(&config).unwrap();
        Updater::new(config, fetcher, NoopObserver).run(false)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(report.is_updated());
    assert_eq!(report.bytes_downloaded, archive.len() as u64);
    assert_eq!(fs::read_to_string(version_file).unwrap(), "12");
    assert!(temp.path().join("rules/emerging-scan.rules").exists());
}
