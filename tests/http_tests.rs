//! Tests for the HTTP client and the headers it sends.

use reqwest::header::{HeaderMap, HeaderValue, RANGE, USER_AGENT};
use std::time::Duration;
use tessera::utils::{accepts_ranges, content_range_total, range_header};
use tessera::{create_http_client, Download, HttpClientConfig, Status};

mod common;
use common::helpers::*;
use common::server::{unreachable_url, TestServer};

#[tokio::test]
async fn test_client_sends_default_headers() {
    let server = TestServer::start(create_test_content(KIB)).await;
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("tessera-test"));

    let client = create_http_client(HttpClientConfig {
        retries: 0,
        headers: Some(headers),
        ..HttpClientConfig::default()
    })
    .unwrap();
    let response = client.get(server.url()).send().await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(server.user_agents(), vec!["tessera-test".to_string()]);
}

#[tokio::test]
async fn test_range_request_round_trip() {
    let content = create_test_content(10 * KIB);
    let server = TestServer::start(content.clone()).await;
    let client = create_http_client(HttpClientConfig::default()).unwrap();

    let response = client
        .get(server.url())
        .header(RANGE, range_header(100, 200))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 206);
    assert!(accepts_ranges(response.headers()));
    assert_eq!(content_range_total(response.headers()), Some(content.len() as u64));
    let body = response.bytes().await.unwrap();
    assert_eq!(&body[..], &content[100..200]);
}

#[tokio::test]
async fn test_connection_refused_is_an_error() {
    let client = create_http_client(HttpClientConfig {
        retries: 0,
        connect_timeout: Duration::from_millis(200),
        ..HttpClientConfig::default()
    })
    .unwrap();

    let error: tessera::Error = client.get(unreachable_url()).send().await.unwrap_err().into();
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_downloader_forwards_headers() {
    let server = TestServer::start(create_test_content(64 * KIB)).await;
    let dir = create_temp_dir();

    let download = Download::try_from(server.url().as_str()).unwrap();
    let summary = fast_builder(dir.path())
        .header(USER_AGENT, HeaderValue::from_static("tessera-downloader"))
        .build()
        .download(&download)
        .await
        .unwrap();

    assert_eq!(summary.status(), &Status::Success);
    let agents = server.user_agents();
    assert!(!agents.is_empty());
    assert!(agents.iter().all(|a| a == "tessera-downloader"));
}
