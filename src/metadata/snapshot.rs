//! The durable snapshot record.
//!
//! A snapshot is an explicit, versioned JSON document describing everything
//! needed to resume a download. It is written by [`DownloadMetadata::persist`]
//! and read back by [`DownloadMetadata::restore`].
//!
//! [`DownloadMetadata::persist`]: super::DownloadMetadata::persist
//! [`DownloadMetadata::restore`]: super::DownloadMetadata::restore

use crate::error::{Error, Result};
use crate::segment::{Segment, SegmentState, SharedSegment};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Extension appended to the output file name to locate its snapshot.
pub const SNAPSHOT_EXTENSION: &str = "metadata";

/// Extension appended to the snapshot path while a new snapshot is written.
pub const TEMP_EXTENSION: &str = "tmp";

/// One segment as stored in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub start: u64,
    pub end: u64,
    pub state: SegmentState,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            start: segment.start(),
            end: segment.end(),
            state: segment.state(),
        }
    }
}

impl From<SegmentRecord> for SharedSegment {
    fn from(record: SegmentRecord) -> Self {
        Arc::new(Segment::with_state(record.start, record.end, record.state))
    }
}

/// Serialized state of a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub urls: Vec<String>,
    pub file_name: String,
    pub file_size: u64,
    pub bytes_completed: u64,
    pub range_enabled: bool,
    /// `None` until the segments of the download have been computed.
    pub segments: Option<Vec<SegmentRecord>>,
}

impl Snapshot {
    /// Encodes the snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decodes and validates a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the version and the invariants a usable snapshot must hold.
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::Snapshot(format!(
                "unsupported version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.urls.is_empty() {
            return Err(Error::Snapshot("no source URL".into()));
        }
        if self.file_name.is_empty() {
            return Err(Error::Snapshot("empty file name".into()));
        }
        if self.bytes_completed > self.file_size {
            return Err(Error::Snapshot(format!(
                "{} bytes completed out of {}",
                self.bytes_completed, self.file_size
            )));
        }
        if let Some(segments) = &self.segments {
            if let Some(bad) = segments
                .iter()
                .find(|s| s.start > s.end || s.end > self.file_size)
            {
                return Err(Error::Snapshot(format!(
                    "segment [{}, {}) outside of [0, {})",
                    bad.start, bad.end, self.file_size
                )));
            }
        }
        Ok(())
    }
}
