//! A local HTTP server serving one payload, for end-to-end download tests.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT_RANGES, CONTENT_RANGE, RANGE, USER_AGENT},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

const NO_TRUNCATION: u64 = u64::MAX;

struct ServerState {
    data: Vec<u8>,
    ranges: bool,
    /// Ranged responses never include bytes at or past this offset.
    truncate_at: AtomicU64,
    /// Ranged responses never carry more than this many bytes.
    response_cap: AtomicU64,
    range_bytes_served: AtomicU64,
    requests: AtomicUsize,
    user_agents: Mutex<Vec<String>>,
}

pub struct TestServer {
    state: Arc<ServerState>,
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serves `data` at `/file.bin` with range support.
    pub async fn start(data: Vec<u8>) -> Self {
        Self::spawn(data, true).await
    }

    /// Serves `data` and ignores `Range` headers.
    pub async fn without_ranges(data: Vec<u8>) -> Self {
        Self::spawn(data, false).await
    }

    async fn spawn(data: Vec<u8>, ranges: bool) -> Self {
        let state = Arc::new(ServerState {
            data,
            ranges,
            truncate_at: AtomicU64::new(NO_TRUNCATION),
            response_cap: AtomicU64::new(NO_TRUNCATION),
            range_bytes_served: AtomicU64::new(0),
            requests: AtomicUsize::new(0),
            user_agents: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/file.bin", get(serve_file))
            .route("/unsized.bin", get(serve_unsized))
            .route("/missing.bin", get(|| async { StatusCode::NOT_FOUND }))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            addr,
            handle,
        }
    }

    pub fn url(&self) -> String {
        self.url_for("file.bin")
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path)
    }

    pub fn truncate_at(&self, offset: u64) {
        self.state.truncate_at.store(offset, Ordering::SeqCst);
    }

    /// Cuts every ranged response short after `len` bytes.
    pub fn cap_responses(&self, len: u64) {
        self.state.response_cap.store(len, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.truncate_at(NO_TRUNCATION);
        self.cap_responses(NO_TRUNCATION);
    }

    /// Body bytes sent in answer to range requests.
    pub fn range_bytes_served(&self) -> u64 {
        self.state.range_bytes_served.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.state.range_bytes_served.store(0, Ordering::SeqCst);
        self.state.requests.store(0, Ordering::SeqCst);
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.state.user_agents.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A URL on which nothing listens.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/file.bin")
}

/// Parses `bytes=<start>-<end>` (inclusive end) against a resource of `size` bytes.
fn parse_range(value: &str, size: u64) -> Option<(u64, u64)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end: u64 = if end.is_empty() { size.checked_sub(1)? } else { end.parse().ok()? };
    let end = end.min(size.checked_sub(1)?);
    (start <= end).then_some((start, end))
}

async fn serve_file(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if let Some(agent) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        state.user_agents.lock().unwrap().push(agent.to_string());
    }

    let size = state.data.len() as u64;
    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_range(v, size));

    match range {
        Some((start, end)) if state.ranges => {
            let limit = state.truncate_at.load(Ordering::SeqCst).max(start);
            let cap = start.saturating_add(state.response_cap.load(Ordering::SeqCst));
            let served_end = (end + 1).min(limit).min(cap);
            let body = state.data[start as usize..served_end as usize].to_vec();
            state
                .range_bytes_served
                .fetch_add(body.len() as u64, Ordering::SeqCst);

            (
                StatusCode::PARTIAL_CONTENT,
                [
                    (CONTENT_RANGE, format!("bytes {start}-{end}/{size}")),
                    (ACCEPT_RANGES, "bytes".to_string()),
                ],
                body,
            )
                .into_response()
        }
        _ => {
            let mut response = (StatusCode::OK, state.data.clone()).into_response();
            if state.ranges {
                response
                    .headers_mut()
                    .insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            }
            response
        }
    }
}

/// A chunked body: no `Content-Length`.
async fn serve_unsized(State(state): State<Arc<ServerState>>) -> Response {
    let data = Bytes::from(state.data.clone());
    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(data) });
    Body::from_stream(stream).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("bytes=0-9", 100), Some((0, 9)));
        assert_eq!(parse_range("bytes=90-200", 100), Some((90, 99)));
        assert_eq!(parse_range("bytes=10-", 100), Some((10, 99)));
        assert_eq!(parse_range("bytes=100-200", 100), None);
        assert_eq!(parse_range("items=0-9", 100), None);
    }
}
