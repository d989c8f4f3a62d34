//! Header extraction utilities.
//!
//! Helpers reading the size of a resource and its byte-range capability from
//! response headers, supporting both `Content-Length` and `Content-Range`.

use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE};

/// Read the `Content-Length` header.
///
/// Returns `None` if the header is missing or its value is not an u64.
///
/// # Example
///
/// ```rust
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
/// use tessera::utils::content_length;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
/// assert_eq!(content_length(&headers), Some(2048));
/// ```
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// # Example
///
/// ```rust
/// use tessera::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// Total size announced by the `Content-Range` header, if any.
pub fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    parse_content_range_total(headers.get(CONTENT_RANGE)?.to_str().ok()?)
}

/// Whether the server advertises byte-range support.
///
/// Any `Accept-Ranges` value other than `none` counts.
pub fn accepts_ranges(headers: &HeaderMap) -> bool {
    match headers.get(ACCEPT_RANGES) {
        None => false,
        Some(value) => {
            let value = value.to_str().unwrap_or_default().trim();
            !value.is_empty() && !value.eq_ignore_ascii_case("none")
        }
    }
}

/// The `Range` header value for the half-open byte range `[start, end)`.
///
/// HTTP ranges are inclusive on both ends, so `end` must be greater than `start`.
pub fn range_header(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end.saturating_sub(1))
}
