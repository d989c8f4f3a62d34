use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tessera::DownloaderBuilder;
use tracing_subscriber::EnvFilter;

pub const KIB: usize = 1024;
pub const MIB: usize = 1024 * 1024;

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates test file content of specified size
///
/// The pattern does not repeat on a power of two, so a chunk written at the
/// wrong offset shows up as a mismatch.
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Installs a test subscriber driven by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A hidden downloader writing to `dir`, with timings short enough for tests.
pub fn fast_builder(dir: &Path) -> DownloaderBuilder {
    DownloaderBuilder::hidden()
        .directory(dir.to_path_buf())
        .retries(0)
        .retry_backoff(Duration::from_millis(10))
        .connect_timeout(Duration::from_millis(500))
        .read_timeout(Duration::from_secs(5))
        .poll_timeout(Duration::from_millis(100))
        .progress_interval(Duration::from_millis(20))
        .persist_retries(1, Duration::from_millis(10))
}

/// Asserts that the file at `path` holds exactly `expected`.
pub fn assert_file_contents(path: &Path, expected: &[u8]) {
    let actual = fs::read(path).expect("Failed to read downloaded file");
    assert_eq!(actual.len(), expected.len(), "File size mismatch at path: {:?}", path);
    if let Some(position) = actual.iter().zip(expected).position(|(a, b)| a != b) {
        panic!("File differs from the source at byte {position}: {:?}", path);
    }
}

/// The snapshot path of `file_name` inside `dir`.
pub fn snapshot_path(dir: &Path, file_name: &str) -> std::path::PathBuf {
    dir.join(format!("{file_name}.metadata"))
}
