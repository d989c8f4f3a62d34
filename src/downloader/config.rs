//! Configuration structures and defaults for the downloader.
//!
//! [`DownloaderConfig`] holds every tunable of a segmented download. It is
//! filled through [`DownloaderBuilder`](super::DownloaderBuilder) and read
//! back through the getters of [`Downloader`](super::Downloader).
//!
//! # Examples
//!
//! ```rust
//! use tessera::downloader::DownloadCallback;
//! use tessera::download::{Status, Summary};
//!
//! let callback: DownloadCallback = Box::new(|summary: &Summary| match summary.status() {
//!     Status::Success => println!("done: {}", summary.download().filename),
//!     Status::Fail(msg) => println!("failed: {} - {}", summary.download().filename, msg),
//!     Status::NotStarted => {}
//! });
//! ```

use crate::download::Summary;
use crate::progress::{ProgressBarOpts, ProgressCallback};

use reqwest::header::HeaderMap;
use std::env::current_dir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Callback type for download completion events
pub type DownloadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Directory where the file and its snapshot are stored.
    pub directory: PathBuf,
    /// Workers requested for range-capable sources of at least `small_file_threshold` bytes.
    pub workers: usize,
    /// Transient HTTP retries performed by the client middleware.
    pub retries: u32,
    /// Consecutive attempts without progress after which a segment is given up for the run.
    pub segment_retries: u32,
    /// Pause after a failed segment attempt.
    pub retry_backoff: Duration,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed between two reads of a response.
    pub read_timeout: Duration,
    /// Size of freshly generated segments.
    pub segment_size: u64,
    /// Bytes a worker accumulates before queueing a chunk.
    pub buffer_size: usize,
    /// Chunks the queue holds before workers have to wait.
    pub queue_capacity: usize,
    /// Files smaller than this are downloaded by a single worker.
    pub small_file_threshold: u64,
    /// How long the write coordinator waits for a chunk before checking whether it is done.
    pub poll_timeout: Duration,
    /// How often the progress reporter samples the download.
    pub progress_interval: Duration,
    /// Snapshot write attempts after the first failed one.
    pub persist_retries: u32,
    /// Pause between snapshot write attempts.
    pub persist_retry_delay: Duration,
    /// Probe the size with `Range: bytes=0-0` instead of a plain GET.
    pub use_range_for_content_length: bool,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Optional proxy.
    pub proxy: Option<reqwest::Proxy>,
    /// Progress bar style.
    pub progress: ProgressBarOpts,
    /// Callback for every percentage change.
    pub on_progress: Option<ProgressCallback>,
    /// Callback for when the download completes.
    pub on_complete: Option<Arc<DownloadCallback>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("directory", &self.directory)
            .field("workers", &self.workers)
            .field("retries", &self.retries)
            .field("segment_retries", &self.segment_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("segment_size", &self.segment_size)
            .field("buffer_size", &self.buffer_size)
            .field("queue_capacity", &self.queue_capacity)
            .field("small_file_threshold", &self.small_file_threshold)
            .field("poll_timeout", &self.poll_timeout)
            .field("progress_interval", &self.progress_interval)
            .field("persist_retries", &self.persist_retries)
            .field("persist_retry_delay", &self.persist_retry_delay)
            .field(
                "use_range_for_content_length",
                &self.use_range_for_content_length,
            )
            .field("headers", &self.headers)
            .field("proxy", &self.proxy)
            .field("progress", &self.progress)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            workers: 1,
            retries: 3,
            segment_retries: 10,
            retry_backoff: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
            segment_size: 4 * 1024,
            buffer_size: 256 * 1024,
            queue_capacity: 64,
            small_file_threshold: 1024 * 1024,
            poll_timeout: Duration::from_secs(1),
            progress_interval: Duration::from_millis(500),
            persist_retries: 10,
            persist_retry_delay: Duration::from_secs(1),
            use_range_for_content_length: false,
            headers: None,
            proxy: None,
            progress: ProgressBarOpts::default(),
            on_progress: None,
            on_complete: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DownloaderConfig::default();
        assert_eq!(config.workers, 1);
        assert_eq!(config.segment_size, 4096);
        assert_eq!(config.buffer_size, 262_144);
        assert_eq!(config.small_file_threshold, 1_048_576);
        assert_eq!(config.segment_retries, 10);
        assert!(!config.use_range_for_content_length);
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let config = DownloaderConfig {
            on_progress: Some(Arc::new(|_: u8| {})),
            ..DownloaderConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("on_progress: true"));
        assert!(debug.contains("on_complete: false"));
    }
}
