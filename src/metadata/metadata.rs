//! Durable download metadata.
//!
//! [`DownloadMetadata`] owns everything a download needs to survive a crash:
//! the mirrors, the output file name, the size learned from the first mirror,
//! the number of bytes durably written and the list of segments.
//!
//! Once the segments are set and the metadata is shared, every mutation goes
//! through atomics (the segment cursors and [`DownloadMetadata::record_progress`]),
//! so the write coordinator can update it while the progress reporter reads it.

use super::snapshot::{SegmentRecord, Snapshot, SNAPSHOT_EXTENSION, SNAPSHOT_VERSION, TEMP_EXTENSION};
use crate::download::Download;
use crate::error::{Error, Result};
use crate::segment::{SegmentState, SharedSegment};
use crate::utils::{accepts_ranges, content_length, content_range_total};

use reqwest::{header::RANGE, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, info, warn};

/// How hard [`DownloadMetadata::persist`] tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistPolicy {
    /// Attempts after the first failed one.
    pub retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for PersistPolicy {
    fn default() -> Self {
        Self {
            retries: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Metadata of a single segmented download.
pub struct DownloadMetadata {
    urls: Vec<Url>,
    file_name: String,
    directory: PathBuf,
    file_size: u64,
    bytes_completed: AtomicU64,
    range_enabled: bool,
    segments: Option<Vec<SharedSegment>>,
    policy: PersistPolicy,
}

impl DownloadMetadata {
    /// Creates empty metadata for `download`, stored under `directory`.
    ///
    /// Nothing is read or written until [`restore`](Self::restore) or
    /// [`initialize`](Self::initialize) is called.
    pub fn new(download: &Download, directory: &Path) -> Self {
        Self {
            urls: download.urls.clone(),
            file_name: download.filename.clone(),
            directory: directory.to_path_buf(),
            file_size: 0,
            bytes_completed: AtomicU64::new(0),
            range_enabled: false,
            segments: None,
            policy: PersistPolicy::default(),
        }
    }

    /// Sets the retry policy used by [`persist`](Self::persist).
    pub fn with_persist_policy(mut self, policy: PersistPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn range_enabled(&self) -> bool {
        self.range_enabled
    }

    /// Bytes durably written so far.
    ///
    /// Read with relaxed ordering: the value only grows and readers such as
    /// the progress reporter tolerate a slightly stale count.
    pub fn bytes_completed(&self) -> u64 {
        self.bytes_completed.load(Ordering::Relaxed)
    }

    /// The segment list, or `None` before it was computed for the first time.
    pub fn segments(&self) -> Option<&[SharedSegment]> {
        self.segments.as_deref()
    }

    /// Where the downloaded bytes go.
    pub fn output_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Where the snapshot lives: `<file>.metadata`.
    pub fn snapshot_path(&self) -> PathBuf {
        with_extension_suffix(&self.output_path(), SNAPSHOT_EXTENSION)
    }

    /// The sibling a new snapshot is written to before being renamed.
    pub fn temp_path(&self) -> PathBuf {
        with_extension_suffix(&self.snapshot_path(), TEMP_EXTENSION)
    }

    /// Loads a previous snapshot, replacing the in-memory state.
    ///
    /// Returns `false` when there is no usable snapshot, in which case the
    /// caller proceeds with a fresh download. A snapshot written for another
    /// file name is not usable.
    pub async fn restore(&mut self) -> bool {
        let path = self.snapshot_path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Cannot read snapshot");
                }
                return false;
            }
        };

        let snapshot = match Snapshot::from_bytes(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unusable snapshot");
                return false;
            }
        };

        if snapshot.file_name != self.file_name {
            warn!(
                path = %path.display(),
                expected = %self.file_name,
                found = %snapshot.file_name,
                "Snapshot belongs to another file"
            );
            return false;
        }

        let urls = match snapshot
            .urls
            .iter()
            .map(|u| Url::parse(u))
            .collect::<std::result::Result<Vec<_>, _>>()
        {
            Ok(urls) => urls,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Snapshot holds an invalid URL");
                return false;
            }
        };

        self.urls = urls;
        self.file_size = snapshot.file_size;
        self.bytes_completed
            .store(snapshot.bytes_completed, Ordering::Relaxed);
        self.range_enabled = snapshot.range_enabled;
        self.segments = snapshot
            .segments
            .map(|records| records.into_iter().map(SharedSegment::from).collect());

        info!(
            path = %path.display(),
            bytes_completed = snapshot.bytes_completed,
            file_size = self.file_size,
            "Using download metadata cache on disk"
        );
        true
    }

    /// Restores a snapshot, or probes the first mirror and persists the result.
    ///
    /// The probe is a GET whose body is never read, or a `Range: bytes=0-0`
    /// GET when `use_range_probe` is set. Anything but a 2xx answer, or an
    /// answer without a size, is fatal.
    ///
    /// Returns whether the state came from a snapshot.
    pub async fn initialize(
        &mut self,
        client: &ClientWithMiddleware,
        use_range_probe: bool,
    ) -> Result<bool> {
        if self.restore().await {
            return Ok(true);
        }

        self.probe(client, use_range_probe).await?;
        self.persist().await;
        Ok(false)
    }

    async fn probe(&mut self, client: &ClientWithMiddleware, use_range_probe: bool) -> Result<()> {
        let url = self
            .urls
            .first()
            .cloned()
            .ok_or_else(|| Error::InvalidUrl("at least one source URL is required".into()))?;

        debug!(%url, use_range_probe, "Probing source");
        let mut request = client.get(url.clone());
        if use_range_probe {
            request = request.header(RANGE, "bytes=0-0");
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadResponse {
                status,
                url: url.to_string(),
            });
        }

        let headers = response.headers();
        let size = if status == StatusCode::PARTIAL_CONTENT {
            content_range_total(headers)
        } else {
            content_length(headers)
        };
        self.file_size = size.ok_or_else(|| Error::UnknownContentLength(url.to_string()))?;
        self.range_enabled = accepts_ranges(headers) || status == StatusCode::PARTIAL_CONTENT;

        info!(
            %url,
            file_size = self.file_size,
            range_enabled = self.range_enabled,
            "Probed source"
        );
        Ok(())
    }

    /// Builds the serializable view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            urls: self.urls.iter().map(Url::to_string).collect(),
            file_name: self.file_name.clone(),
            file_size: self.file_size,
            bytes_completed: self.bytes_completed(),
            range_enabled: self.range_enabled,
            segments: self
                .segments
                .as_ref()
                .map(|segments| segments.iter().map(|s| SegmentRecord::from(s.as_ref())).collect()),
        }
    }

    /// Writes the snapshot to the temporary path and renames it over the
    /// canonical one.
    ///
    /// Failures are retried according to the [`PersistPolicy`]. When every
    /// attempt fails the error is logged and `false` returned: the download
    /// goes on, only its resumability suffers.
    pub async fn persist(&self) -> bool {
        let mut last_error = None;
        for attempt in 0..=self.policy.retries {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay).await;
            }
            match self.write_snapshot().await {
                Ok(()) => return true,
                Err(e) => {
                    debug!(attempt, error = %e, "Snapshot write failed");
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            error!(
                path = %self.snapshot_path().display(),
                retries = self.policy.retries,
                error = %e,
                "Failed to persist download metadata"
            );
        }
        false
    }

    async fn write_snapshot(&self) -> Result<()> {
        let bytes = self.snapshot().to_bytes()?;
        let temp = self.temp_path();

        let mut file = fs::File::create(&temp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, self.snapshot_path()).await?;
        Ok(())
    }

    /// Adds `bytes` to the completed count, clamped at the file size, and
    /// returns the new count.
    pub fn record_progress(&self, bytes: u64) -> u64 {
        let size = self.file_size;
        let previous = self
            .bytes_completed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(bytes).min(size))
            })
            .unwrap_or_else(|current| current);
        previous.saturating_add(bytes).min(size)
    }

    /// Flattens per-worker partitions into the durable segment list.
    pub fn set_segments(&mut self, partitions: &[Vec<SharedSegment>]) {
        self.segments = Some(partitions.iter().flatten().cloned().collect());
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_completed() == self.file_size
    }

    /// Whether every segment stopped producing (vacuously true without segments).
    pub fn all_finished_producing(&self) -> bool {
        self.segments
            .iter()
            .flatten()
            .all(|segment| segment.state() == SegmentState::FinishedProducing)
    }

    /// Rounded share of the file already on disk, in percent.
    pub fn percentage(&self) -> u8 {
        percentage(self.bytes_completed(), self.file_size)
    }

    /// Removes the snapshot and its temporary sibling.
    pub async fn cleanup(&self) {
        for path in [self.snapshot_path(), self.temp_path()] {
            match fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed snapshot file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot remove snapshot file"),
            }
        }
    }
}

impl fmt::Debug for DownloadMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadMetadata")
            .field("urls", &self.urls)
            .field("file_name", &self.file_name)
            .field("directory", &self.directory)
            .field("file_size", &self.file_size)
            .field("bytes_completed", &self.bytes_completed())
            .field("range_enabled", &self.range_enabled)
            .field("segments", &self.segments.as_ref().map(Vec::len))
            .finish()
    }
}

/// `round(completed / total * 100)`; an empty file is always 100%.
pub fn percentage(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

fn with_extension_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
