//! Tessera downloads one file from one or more mirrors by cutting it into
//! byte-range segments, fetching them concurrently and funnelling the bytes
//! through a bounded queue to a single disk writer. Progress is persisted
//! after every write, so an interrupted download resumes where it stopped.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use tessera::{download::Download, downloader::DownloaderBuilder, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let download = Download::mirrors([
//!     "https://mirror-a.example.com/ubuntu.iso",
//!     "https://mirror-b.example.com/ubuntu.iso",
//! ])?;
//! let downloader = DownloaderBuilder::new()
//!     .directory(PathBuf::from("output"))
//!     .workers(8)
//!     .build();
//! let summary = downloader.download(&download).await?;
//! println!("{:?}", summary.status());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - The `Download` request and its `Summary`
//! - [`downloader`] - The `Downloader` and `DownloaderBuilder` orchestrating a download
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client construction
//! - [`metadata`] - Durable download state and its snapshot format
//! - [`progress`] - Progress bar styling and the progress reporter
//! - [`segment`] - Segments and the algorithms that generate, deal and merge them
//! - [`utils`] - HTTP header helpers
//! - [`worker`] - Download workers and the chunks they produce
//! - [`writer`] - The write coordinator

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod metadata;
pub mod progress;
pub mod segment;
pub mod utils;
pub mod worker;
pub mod writer;

pub use download::{Download, Status, Summary};
pub use downloader::{Downloader, DownloaderBuilder};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use metadata::DownloadMetadata;
pub use progress::ProgressBarOpts;
pub use segment::{Segment, SegmentState, SharedSegment};
