//! Shared utility functions.
//!
//! This module contains helpers used by both the metadata probe and the
//! download workers.
//!
//! # Overview
//!
//! - [`headers`] - Size and range-capability extraction from HTTP headers
//!
//! # Examples
//!
//! ```rust
//! use tessera::utils::{parse_content_range_total, range_header};
//!
//! assert_eq!(parse_content_range_total("bytes 0-0/2048"), Some(2048));
//! assert_eq!(range_header(0, 2048), "bytes=0-2047");
//! ```

pub mod headers;

pub use headers::{
    accepts_ranges, content_length, content_range_total, parse_content_range_total, range_header,
};
