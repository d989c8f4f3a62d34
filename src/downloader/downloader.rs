//! Core downloader implementation.
//!
//! [`Downloader::download`] wires every component together: it probes (or
//! restores) the download metadata, cuts the file into segments, deals them
//! to the workers, runs the write coordinator until the queue drains and
//! reports the outcome as a [`Summary`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use tessera::downloader::DownloaderBuilder;
//! use tessera::download::Download;
//!
//! # async fn example() -> Result<(), tessera::Error> {
//! let downloader = DownloaderBuilder::new()
//!     .directory("downloads".into())
//!     .workers(4)
//!     .build();
//!
//! let download = Download::mirrors([
//!     "https://eu.example.com/disk.img",
//!     "https://us.example.com/disk.img",
//! ])?;
//!
//! let summary = downloader.download(&download).await?;
//! println!("{:?} after {} bytes", summary.status(), summary.bytes_completed());
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use crate::download::{Download, Status, Summary};
use crate::error::Result;
use crate::http::{create_http_client, HttpClientConfig};
use crate::metadata::{DownloadMetadata, PersistPolicy};
use crate::progress::{ProgressBarOpts, ProgressReporter};
use crate::segment::{allocate, generate_shared, SharedSegment};
use crate::worker::{DownloadWorker, WorkerOptions};
use crate::writer::WriteCoordinator;

use reqwest::header::HeaderMap;
use reqwest::Url;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::{fs, fs::OpenOptions, sync::mpsc};
use tracing::{debug, error, info, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use tessera::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build();
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    /// Workers requested. See [`Downloader::worker_count`] for the number actually used.
    pub fn workers(&self) -> usize {
        self.config.workers
    }

    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    pub fn segment_retries(&self) -> u32 {
        self.config.segment_retries
    }

    pub fn retry_backoff(&self) -> Duration {
        self.config.retry_backoff
    }

    pub fn connect_timeout(&self) -> Duration {
        self.config.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.config.read_timeout
    }

    pub fn segment_size(&self) -> u64 {
        self.config.segment_size
    }

    pub fn buffer_size(&self) -> usize {
        self.config.buffer_size
    }

    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    pub fn small_file_threshold(&self) -> u64 {
        self.config.small_file_threshold
    }

    pub fn poll_timeout(&self) -> Duration {
        self.config.poll_timeout
    }

    pub fn progress_interval(&self) -> Duration {
        self.config.progress_interval
    }

    pub fn persist_retries(&self) -> u32 {
        self.config.persist_retries
    }

    pub fn persist_retry_delay(&self) -> Duration {
        self.config.persist_retry_delay
    }

    pub fn use_range_for_content_length(&self) -> bool {
        self.config.use_range_for_content_length
    }

    /// Gets the custom headers.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.headers.as_ref()
    }

    pub fn progress(&self) -> &ProgressBarOpts {
        &self.config.progress
    }

    /// Number of workers for a file of `size` bytes.
    ///
    /// Sources without range support and small files get a single worker.
    pub fn worker_count(&self, size: u64, range_enabled: bool) -> usize {
        if !range_enabled || size < self.config.small_file_threshold {
            1
        } else {
            self.config.workers.max(1)
        }
    }

    fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            retries: self.config.retries,
            proxy: self.config.proxy.clone(),
            headers: self.config.headers.clone(),
            connect_timeout: self.config.connect_timeout,
            read_timeout: self.config.read_timeout,
        }
    }

    fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            buffer_size: self.config.buffer_size,
            segment_retries: self.config.segment_retries,
            retry_backoff: self.config.retry_backoff,
        }
    }

    /// Downloads (or resumes) `download` into the configured directory.
    ///
    /// `Err` is returned only when the download cannot start at all: the
    /// source cannot be probed, its size is unknown, or the output file
    /// cannot be prepared. A download that ran but left bytes missing comes
    /// back as `Ok` with [`Status::Fail`]; its snapshot is kept so the next
    /// call resumes it.
    pub async fn download(&self, download: &Download) -> Result<Summary> {
        let client = create_http_client(self.http_client_config())?;
        fs::create_dir_all(&self.config.directory).await?;

        let mut metadata = DownloadMetadata::new(download, &self.config.directory)
            .with_persist_policy(PersistPolicy {
                retries: self.config.persist_retries,
                delay: self.config.persist_retry_delay,
            });
        let resumed = metadata
            .initialize(&client, self.config.use_range_for_content_length)
            .await?;

        let size = metadata.file_size();
        let range_enabled = metadata.range_enabled();
        let workers = self.worker_count(size, range_enabled);

        let segments: Vec<SharedSegment> = match metadata.segments() {
            Some(segments) => segments.to_vec(),
            None if range_enabled => generate_shared(0, size, self.config.segment_size),
            // Without ranges the whole file is one request.
            None => generate_shared(0, size, size),
        };
        let partitions = allocate(segments, workers);
        metadata.set_segments(&partitions);
        metadata.persist().await;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(metadata.output_path())
            .await?;
        file.set_len(size).await?;

        info!(
            file = %metadata.output_path().display(),
            size,
            range_enabled,
            resumed,
            workers = partitions.len(),
            bytes_completed = metadata.bytes_completed(),
            "Starting download"
        );

        let metadata = Arc::new(metadata);
        let urls: Arc<[Url]> = Arc::from(metadata.urls());
        let spawned = partitions.len();

        let (queue, chunks) = mpsc::channel(self.config.queue_capacity.max(1));
        let handles: Vec<_> = partitions
            .into_iter()
            .enumerate()
            .map(|(id, partition)| {
                let worker = DownloadWorker::new(
                    id,
                    client.clone(),
                    urls.clone(),
                    partition,
                    queue.clone(),
                    self.worker_options(),
                );
                tokio::spawn(worker.run())
            })
            .collect();
        // Only the workers hold senders now, so the queue closes when the last one is done.
        drop(queue);

        let reporter = ProgressReporter::spawn(
            metadata.clone(),
            self.config.progress_interval,
            &self.config.progress,
            self.config.on_progress.clone(),
        );

        let written = WriteCoordinator::new(file, metadata.clone(), chunks, self.config.poll_timeout)
            .run()
            .await;
        if written.write_errors > 0 {
            warn!(errors = written.write_errors, "Some chunks could not be written");
        }

        for handle in handles {
            match handle.await {
                Ok(report) => debug!(?report, "Worker joined"),
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }
        reporter.stop().await;

        let summary = Summary::new(
            Download {
                urls: metadata.urls().to_vec(),
                filename: metadata.file_name().to_string(),
            },
            size,
        )
        .with_progress(metadata.bytes_completed())
        .with_run(spawned, resumed, range_enabled);

        let summary = if metadata.is_complete() {
            metadata.cleanup().await;
            info!(file = %metadata.output_path().display(), size, "Download complete");
            summary.with_status(Status::Success)
        } else {
            let reason = format!(
                "incomplete: {}% ({} of {} bytes), run again to resume",
                metadata.percentage(),
                metadata.bytes_completed(),
                size
            );
            warn!(file = %metadata.output_path().display(), %reason, "Download failed");
            summary.fail(reason)
        };

        if let Some(ref callback) = self.config.on_complete {
            callback(&summary);
        }

        Ok(summary)
    }
}
