//! Download module containing the request and outcome types.
//!
//! # Overview
//!
//! - [`download`] - The [`Download`] request: mirror URLs and output file name
//! - [`summary`] - Result tracking and status reporting
//!
//! # Examples
//!
//! ```rust
//! use tessera::download::{Download, Status, Summary};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let download = Download::try_from("https://example.com/file.zip")?;
//! let summary = Summary::new(download, 1024).fail("connection reset");
//!
//! match summary.status() {
//!     Status::Success => println!("Download completed successfully"),
//!     Status::Fail(msg) => println!("Download failed, resumable later: {}", msg),
//!     Status::NotStarted => println!("Download not started"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod download;
pub mod summary;

pub use download::{filename_from_url, Download};
pub use summary::{Status, Summary};
