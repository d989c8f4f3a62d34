//! Progress module containing the progress bar and its reporter.
//!
//! # Overview
//!
//! - `style` - Progress bar styling options and templates
//! - `reporter` - Background task that polls the download and reports its percentage
//!
//! # Examples
//!
//! ```rust
//! use tessera::downloader::DownloaderBuilder;
//! use tessera::progress::ProgressBarOpts;
//! use std::sync::Arc;
//!
//! let downloader = DownloaderBuilder::new()
//!     .progress(ProgressBarOpts::with_line_style())
//!     .on_progress(Arc::new(|percentage: u8| eprintln!("{percentage}%")))
//!     .build();
//! ```

pub(crate) mod reporter;
pub(crate) mod style;

pub use reporter::{ProgressCallback, ProgressReporter};
pub use style::ProgressBarOpts;
