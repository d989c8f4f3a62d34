//! Download summary functionality.
//!
//! This module contains the [`Summary`] struct and [`Status`] enum reporting
//! the outcome of a segmented download.
//!
//! # Examples
//!
//! ```rust
//! use tessera::download::{Download, Status, Summary};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let download = Download::try_from("https://example.com/file.zip")?;
//! let summary = Summary::new(download, 2048)
//!     .with_progress(2048)
//!     .with_status(Status::Success);
//!
//! assert!(summary.is_success());
//! println!("Downloaded {} bytes", summary.bytes_completed());
//! # Ok(())
//! # }
//! ```

use super::download::Download;

/// Download status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Download did not complete; the snapshot was kept for a later resume.
    Fail(String),
    /// Download not yet started
    NotStarted,
    /// Download completed and its snapshot was removed.
    Success,
}

/// Represents a [`Download`] summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Downloaded item.
    download: Download,
    /// Size of the file in bytes.
    size: u64,
    /// Bytes durably written, including those from previous runs.
    bytes_completed: u64,
    /// Number of workers that ran.
    workers: usize,
    /// Whether the run started from a snapshot.
    resumed: bool,
    /// Whether the source supports byte ranges.
    range_enabled: bool,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Download`] [`Summary`].
    pub fn new(download: Download, size: u64) -> Self {
        Self {
            download,
            size,
            bytes_completed: 0,
            workers: 0,
            resumed: false,
            range_enabled: false,
            status: Status::NotStarted,
        }
    }

    /// Attach a status to a [`Download`] [`Summary`].
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Record how many bytes are on disk.
    pub fn with_progress(self, bytes_completed: u64) -> Self {
        Self {
            bytes_completed,
            ..self
        }
    }

    /// Record how the download was run.
    pub fn with_run(self, workers: usize, resumed: bool, range_enabled: bool) -> Self {
        Self {
            workers,
            resumed,
            range_enabled,
            ..self
        }
    }

    /// Mark the summary as failed with a message.
    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{}", msg)),
            ..self
        }
    }

    /// Get a reference to the summary's download.
    pub fn download(&self) -> &Download {
        &self.download
    }

    /// Get the file size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the number of bytes on disk.
    pub fn bytes_completed(&self) -> u64 {
        self.bytes_completed
    }

    /// Get the number of workers used.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether the run resumed a previous one.
    #[must_use]
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    /// Whether the source supports byte ranges.
    #[must_use]
    pub fn range_enabled(&self) -> bool {
        self.range_enabled
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Shortcut for `status() == &Status::Success`.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_download() -> Download {
        Download::try_from("http://example.com/test.zip").unwrap()
    }

    #[test]
    fn test_summary_creation() {
        let summary = Summary::new(create_test_download(), 1024);

        assert_eq!(summary.size(), 1024);
        assert_eq!(summary.bytes_completed(), 0);
        assert_eq!(summary.download().filename, "test.zip");
        assert_eq!(summary.status(), &Status::NotStarted);
        assert!(!summary.resumed());
        assert!(!summary.is_success());
    }

    #[test]
    fn test_summary_with_run() {
        let summary = Summary::new(create_test_download(), 1024)
            .with_run(4, true, true)
            .with_progress(512);

        assert_eq!(summary.workers(), 4);
        assert!(summary.resumed());
        assert!(summary.range_enabled());
        assert_eq!(summary.bytes_completed(), 512);
    }

    #[test]
    fn test_summary_fail() {
        let summary = Summary::new(create_test_download(), 0).fail("Network error");

        match summary.status() {
            Status::Fail(msg) => assert_eq!(msg, "Network error"),
            _ => panic!("Expected Fail status"),
        }
    }
}
