//! HTTP module containing the client shared by the probe and the workers.
//!
//! - [`client`] - Client creation with tracing, retry, timeout, proxy and header configuration
//!
//! Header parsing helpers (`Content-Length`, `Content-Range`, `Accept-Ranges`,
//! `Range`) live in [`crate::utils`].

pub mod client;

pub use client::{create_http_client, HttpClientConfig};
