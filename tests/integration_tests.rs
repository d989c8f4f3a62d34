//! End-to-end downloads against a local server.
//!
//! These tests drive the whole pipeline: probe, segment allocation, workers,
//! the write coordinator, snapshot persistence and resume.

use std::time::Duration;
use tessera::metadata::Snapshot;
use tessera::{Download, Status};

mod common;
use common::helpers::*;
use common::server::{unreachable_url, TestServer};

#[tokio::test]
async fn test_parallel_download_is_bit_identical() {
    init_tracing();
    let content = create_test_content(10 * MIB);
    let server = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();

    let download = Download::try_from(server.url().as_str()).unwrap();
    let summary = fast_builder(dir.path())
        .workers(4)
        .build()
        .download(&download)
        .await
        .unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert_eq!(summary.size(), content.len() as u64);
    assert_eq!(summary.bytes_completed(), content.len() as u64);
    assert_eq!(summary.workers(), 4);
    assert!(summary.range_enabled());
    assert!(!summary.resumed());

    assert_file_contents(&dir.path().join("file.bin"), &content);
    assert!(!snapshot_path(dir.path(), "file.bin").exists());
    assert!(!dir.path().join("file.bin.metadata.tmp").exists());
    assert_eq!(server.range_bytes_served(), content.len() as u64);
}

#[tokio::test]
async fn test_interrupted_download_resumes() {
    init_tracing();
    let content = create_test_content(2 * MIB);
    let server = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();
    let download = Download::try_from(server.url().as_str()).unwrap();
    let downloader = fast_builder(dir.path())
        .workers(2)
        .segment_retries(2)
        .build();

    // Nothing past the first MiB is ever sent.
    server.truncate_at(MIB as u64);
    let summary = downloader.download(&download).await.unwrap();

    match summary.status() {
        Status::Fail(reason) => assert!(reason.contains("50%"), "{reason}"),
        status => panic!("expected a failure, got {status:?}"),
    }
    assert_eq!(summary.bytes_completed(), MIB as u64);

    let snapshot_file = snapshot_path(dir.path(), "file.bin");
    let snapshot = Snapshot::from_bytes(&std::fs::read(&snapshot_file).unwrap()).unwrap();
    assert_eq!(snapshot.bytes_completed, MIB as u64);
    assert_eq!(snapshot.file_size, 2 * MIB as u64);

    server.heal();
    server.reset_counters();
    let summary = downloader.download(&download).await.unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert!(summary.resumed());
    assert_eq!(server.range_bytes_served(), MIB as u64);
    assert_file_contents(&dir.path().join("file.bin"), &content);
    assert!(!snapshot_file.exists());
}

#[tokio::test]
async fn test_unreachable_mirror_is_tolerated() {
    init_tracing();
    let content = create_test_content(4 * MIB);
    let first = TestServer::start(content.clone()).await;
    let second = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();

    let download = Download::mirrors([first.url(), unreachable_url(), second.url()]).unwrap();
    let summary = fast_builder(dir.path())
        .workers(16)
        .segment_retries(30)
        .connect_timeout(Duration::from_millis(200))
        .build()
        .download(&download)
        .await
        .unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert_eq!(summary.download().urls.len(), 3);
    assert_eq!(summary.workers(), 16);
    assert_file_contents(&dir.path().join("file.bin"), &content);

    // Every attempt picks its mirror at random, so both healthy ones are used.
    assert!(first.range_bytes_served() > 0);
    assert!(second.range_bytes_served() > 0);
    assert_eq!(
        first.range_bytes_served() + second.range_bytes_served(),
        content.len() as u64
    );
}

#[tokio::test]
async fn test_short_responses_keep_making_progress() {
    init_tracing();
    let content = create_test_content(2 * MIB);
    let server = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();

    // Eight cut-short attempts are needed, far more than the retry ceiling.
    server.cap_responses(256 * KIB as u64);
    let download = Download::try_from(server.url().as_str()).unwrap();
    let summary = fast_builder(dir.path())
        .workers(1)
        .segment_retries(3)
        .retry_backoff(Duration::from_millis(50))
        .build()
        .download(&download)
        .await
        .unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert_eq!(summary.bytes_completed(), content.len() as u64);
    assert_file_contents(&dir.path().join("file.bin"), &content);
    assert!(server.requests() >= 9);
    assert!(!snapshot_path(dir.path(), "file.bin").exists());
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_over() {
    let content = create_test_content(300 * KIB);
    let server = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();
    std::fs::write(snapshot_path(dir.path(), "file.bin"), b"{ not json").unwrap();

    let download = Download::try_from(server.url().as_str()).unwrap();
    let summary = fast_builder(dir.path()).build().download(&download).await.unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert!(!summary.resumed());
    assert_file_contents(&dir.path().join("file.bin"), &content);
}

#[tokio::test]
async fn test_completed_snapshot_needs_no_request() {
    let content = create_test_content(64 * KIB);
    let server = TestServer::start(content.clone()).await;
    let dir = create_temp_dir();
    let download = Download::try_from(server.url().as_str()).unwrap();
    let downloader = fast_builder(dir.path()).build();

    // A crash right after the last write, before cleanup.
    std::fs::write(dir.path().join("file.bin"), &content).unwrap();
    let snapshot = Snapshot {
        version: tessera::metadata::SNAPSHOT_VERSION,
        urls: vec![server.url()],
        file_name: "file.bin".into(),
        file_size: content.len() as u64,
        bytes_completed: content.len() as u64,
        range_enabled: true,
        segments: Some(Vec::new()),
    };
    std::fs::write(snapshot_path(dir.path(), "file.bin"), snapshot.to_bytes().unwrap()).unwrap();

    let summary = downloader.download(&download).await.unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert!(summary.resumed());
    assert_eq!(summary.workers(), 0);
    assert_eq!(server.requests(), 0);
    assert_file_contents(&dir.path().join("file.bin"), &content);
    assert!(!snapshot_path(dir.path(), "file.bin").exists());
}

#[tokio::test]
async fn test_empty_file() {
    let server = TestServer::start(Vec::new()).await;
    let dir = create_temp_dir();

    let download = Download::try_from(server.url().as_str()).unwrap();
    let summary = fast_builder(dir.path())
        .workers(4)
        .build()
        .download(&download)
        .await
        .unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert_eq!(summary.size(), 0);
    assert_eq!(std::fs::metadata(dir.path().join("file.bin")).unwrap().len(), 0);
}
