//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use tessera::downloader::DownloaderBuilder;
//! use tessera::download::Status;
//! use std::time::Duration;
//!
//! let downloader = DownloaderBuilder::new()
//!     .directory("downloads".into())
//!     .workers(8)
//!     .segment_retries(5)
//!     .retry_backoff(Duration::from_millis(500))
//!     .on_complete(|summary| {
//!         if let Status::Fail(reason) = summary.status() {
//!             eprintln!("{} failed: {}", summary.download().filename, reason);
//!         }
//!     })
//!     .build();
//! assert_eq!(downloader.workers(), 8);
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::download::Summary;
use crate::progress::{ProgressBarOpts, ProgressCallback};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main()  {
/// use tessera::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().workers(4).directory("downloads".into()).build();
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Convenience function to hide the progress bar.
    pub fn hidden() -> Self {
        let mut builder = DownloaderBuilder::default();
        builder.config.progress = ProgressBarOpts::hidden();
        builder
    }

    /// Sets the directory where to store the file and its snapshot.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Set the number of workers.
    ///
    /// Sources without range support, and files smaller than the
    /// [small file threshold](Self::small_file_threshold), always use one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the number of transient HTTP retries done by the client.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set how many failed attempts in a row without progress a segment survives
    /// before it is given up.
    pub fn segment_retries(mut self, segment_retries: u32) -> Self {
        self.config.segment_retries = segment_retries;
        self
    }

    /// Set the pause after a failed segment attempt.
    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.config.retry_backoff = retry_backoff;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.config.connect_timeout = connect_timeout;
        self
    }

    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.config.read_timeout = read_timeout;
        self
    }

    /// Set the size of freshly generated segments.
    pub fn segment_size(mut self, segment_size: u64) -> Self {
        self.config.segment_size = segment_size;
        self
    }

    /// Set how many bytes a worker buffers before queueing them.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size;
        self
    }

    /// Set how many chunks may wait for the disk before workers block.
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.config.queue_capacity = queue_capacity;
        self
    }

    /// Files below this size are downloaded by a single worker.
    pub fn small_file_threshold(mut self, small_file_threshold: u64) -> Self {
        self.config.small_file_threshold = small_file_threshold;
        self
    }

    pub fn poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.config.poll_timeout = poll_timeout;
        self
    }

    pub fn progress_interval(mut self, progress_interval: Duration) -> Self {
        self.config.progress_interval = progress_interval;
        self
    }

    /// Set how often a failed snapshot write is retried, and the pause in between.
    pub fn persist_retries(mut self, persist_retries: u32, delay: Duration) -> Self {
        self.config.persist_retries = persist_retries;
        self.config.persist_retry_delay = delay;
        self
    }

    /// Probe the file size with a `Range: bytes=0-0` request.
    ///
    /// This is useful when servers don't announce a usable `Content-Length`
    /// but do answer range requests with a `Content-Range` total.
    pub fn use_range_for_content_length(mut self, use_range: bool) -> Self {
        self.config.use_range_for_content_length = use_range;
        self
    }

    /// Route every request through `proxy`.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the progress bar style.
    pub fn progress(mut self, progress: ProgressBarOpts) -> Self {
        self.config.progress = progress;
        self
    }

    /// Set callback for every change of the completion percentage.
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.config.on_progress = Some(callback);
        self
    }

    /// Set callback for when the download completes, successfully or not.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// Calling `.headers()` several times merges every map into one.
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue, HeaderMap};
    /// use tessera::downloader::DownloaderBuilder;
    ///
    /// let ua = HeaderValue::from_static("curl/7.87");
    ///
    /// let downloader = DownloaderBuilder::new()
    ///     .headers(HeaderMap::from_iter([(header::USER_AGENT, ua)]))
    ///     .build();
    /// assert!(downloader.headers().is_some());
    /// ```
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add one http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Downloader {
        Downloader::new(self.config)
    }
}
