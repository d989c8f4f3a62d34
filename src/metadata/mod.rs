//! Metadata module containing the durable state of a download.
//!
//! # Overview
//!
//! - `metadata` - [`DownloadMetadata`]: restore, probe, persist, progress and cleanup
//! - `snapshot` - The versioned [`Snapshot`] record written to `<file>.metadata`
//!
//! # Durability
//!
//! Snapshots are written to `<file>.metadata.tmp`, synced, then renamed over
//! `<file>.metadata`, so a crash never leaves a half-written snapshot behind.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tessera::download::Download;
//! use tessera::http::{create_http_client, HttpClientConfig};
//! use tessera::metadata::DownloadMetadata;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), tessera::Error> {
//! let download = Download::try_from("https://example.com/file.iso")?;
//! let client = create_http_client(HttpClientConfig::default())?;
//!
//! let mut metadata = DownloadMetadata::new(&download, Path::new("downloads"));
//! let resumed = metadata.initialize(&client, false).await?;
//! println!("{} bytes, resumed: {}", metadata.file_size(), resumed);
//! # Ok(())
//! # }
//! ```

pub mod metadata;
pub mod snapshot;

pub use metadata::{percentage, DownloadMetadata, PersistPolicy};
pub use snapshot::{SegmentRecord, Snapshot, SNAPSHOT_VERSION};
