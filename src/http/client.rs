//! HTTP client setup and middleware configuration.
//!
//! Every request of a download (the size probe and the ranged segment
//! fetches) goes through one [`ClientWithMiddleware`] built here:
//!
//! - **Tracing**: requests and responses show up as `tracing` spans
//! - **Retry**: transient failures (connection errors, 5xx) are retried with
//!   exponential backoff before the caller ever sees them
//! - **Timeouts**: a connect timeout and a per-read timeout, so a stalled
//!   mirror turns into an error instead of hanging a worker
//! - **Proxy / headers**: optional, applied to every request
//!
//! # Examples
//!
//! ```rust
//! use tessera::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, USER_AGENT};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "tessera/0.1".parse()?);
//!
//! let config = HttpClientConfig {
//!     retries: 5,
//!     headers: Some(headers),
//!     read_timeout: Duration::from_secs(30),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Retries of the middleware for transient request failures.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed between two reads of a response.
    pub read_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            proxy: None,
            headers: None,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// Creates an HTTP client with middleware configuration.
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries);

    let mut inner = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout);

    if let Some(proxy) = config.proxy {
        inner = inner.proxy(proxy);
    }
    if let Some(headers) = config.headers {
        inner = inner.default_headers(headers);
    }

    let client = ClientBuilder::new(inner.build()?)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    Ok(client)
}
