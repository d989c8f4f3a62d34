//! Error handling for the Tessera library.
//!
//! This module provides centralized error handling for every stage of a
//! segmented download: URL validation, the initial capability probe, segment
//! range requests, disk I/O and snapshot persistence.

use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Errors that can happen when using Tessera.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// This variant captures internal errors that don't fit into other categories.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    ///
    /// Returned when a source URL cannot be parsed, carries no file name, or
    /// when no source URL was given at all.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O Error.
    ///
    /// Wraps errors raised while opening, extending or writing the output
    /// file and while reading or replacing the snapshot.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    ///
    /// Raised mostly while streaming a response body.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the HTTP middleware stack (connection failures, exhausted
    /// transient retries, malformed requests).
    #[error("HTTP request failed: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The server answered with a status the caller cannot use.
    #[error("Bad response from {url}: {status}")]
    BadResponse { status: StatusCode, url: String },

    /// A segment response ended before every byte of the segment arrived.
    #[error("Incomplete body from {url}: {received} of {expected} bytes")]
    Incomplete {
        url: String,
        received: u64,
        expected: u64,
    },

    /// The probe response did not announce the size of the file.
    #[error("The server did not report the size of {0}")]
    UnknownContentLength(String),

    /// A snapshot was read successfully but describes an impossible state.
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    /// A snapshot could not be encoded or decoded.
    #[error("Snapshot serialization error")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// The write coordinator stopped accepting chunks.
    #[error("The chunk queue was closed")]
    QueueClosed,
}

impl Error {
    /// Whether a failed segment attempt that produced this error may be
    /// retried against the same (or another) mirror.
    ///
    /// Malformed requests and a closed queue are permanent; everything else
    /// seen by a worker is transient from the segment's point of view.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::InvalidUrl(_) | Error::QueueClosed => false,
            Error::Reqwest { source } => !source.is_builder(),
            Error::Middleware { source } => match source {
                reqwest_middleware::Error::Reqwest(e) => !e.is_builder(),
                reqwest_middleware::Error::Middleware(_) => true,
            },
            _ => true,
        }
    }
}

/// Result type alias for operations that can fail with a Tessera error.
pub type Result<T> = std::result::Result<T, Error>;
