//! Downloader module containing the orchestration, its builder and configuration.
//!
//! # Overview
//!
//! - `downloader` - [`Downloader`]: probe or restore, allocate, run workers and writer, decide
//! - `builder` - [`DownloaderBuilder`] for configuring a [`Downloader`]
//! - `config` - [`DownloaderConfig`] with its defaults and the callback types
//!
//! # Examples
//!
//! ```rust,no_run
//! use tessera::downloader::DownloaderBuilder;
//! use tessera::download::Download;
//!
//! # async fn example() -> Result<(), tessera::Error> {
//! let downloader = DownloaderBuilder::hidden().workers(4).build();
//! let summary = downloader
//!     .download(&Download::try_from("https://example.com/file.iso")?)
//!     .await?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;

pub use builder::DownloaderBuilder;
pub use config::{DownloadCallback, DownloaderConfig};
pub use downloader::Downloader;
