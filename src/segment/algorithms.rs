//! Pure functions over collections of segments.
//!
//! - [`generate`] cuts a byte range into fixed-size segments.
//! - [`partition`] deals an ordered list into `n` parts of near-equal count.
//! - [`balance`] deals an ordered list into `n` parts of near-equal bytes.
//! - [`inflate`] bisects every segment a fixed number of rounds.
//! - [`compress`] merges contiguous segments back into maximal runs.
//! - [`allocate`] balances and compresses what is left into per-worker partitions.
//!
//! # Examples
//!
//! ```rust
//! use tessera::segment::{allocate, generate};
//! use std::sync::Arc;
//!
//! let segments: Vec<_> = generate(0, 1 << 20, 4096).map(Arc::new).collect();
//! let partitions = allocate(segments, 4);
//!
//! assert_eq!(partitions.len(), 4);
//! // Each worker ends up with one contiguous run of 256 KiB.
//! assert!(partitions.iter().all(|p| p.len() == 1 && p[0].remaining() == 1 << 18));
//! ```

use super::segment::{Segment, SegmentState, SharedSegment};
use std::sync::Arc;

/// Lazy iterator returned by [`generate`].
#[derive(Debug, Clone)]
pub struct Segments {
    next: u64,
    end: u64,
    segment_size: u64,
}

impl Iterator for Segments {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.segment_size).min(self.end);
        self.next = end;
        Some(Segment::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let span = self.end.saturating_sub(self.next);
        let count = span.div_ceil(self.segment_size) as usize;
        (count, Some(count))
    }
}

/// Cuts `[start, end)` into contiguous segments of at most `segment_size` bytes.
///
/// The last segment may be shorter. A `segment_size` of zero yields a single
/// segment covering the whole range.
pub fn generate(start: u64, end: u64, segment_size: u64) -> Segments {
    let segment_size = if segment_size == 0 {
        end.saturating_sub(start).max(1)
    } else {
        segment_size
    };
    Segments {
        next: start,
        end,
        segment_size,
    }
}

/// Splits an ordered list into exactly `n` ordered parts.
///
/// Parts differ in length by at most one; the first `len % n` parts get the
/// extra element. When `n` exceeds the list length the trailing parts are
/// empty. `n == 0` is treated as 1.
pub fn partition<T>(items: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let n = n.max(1);
    let base = items.len() / n;
    let mut extra = items.len() % n;

    let mut parts = Vec::with_capacity(n);
    let mut iter = items.into_iter();
    for _ in 0..n {
        let take = if extra > 0 {
            extra -= 1;
            base + 1
        } else {
            base
        };
        parts.push(iter.by_ref().take(take).collect());
    }

    parts
}

/// Splits every segment in two at the byte midpoint of what is left of it.
fn bisect(segments: &[SharedSegment]) -> Vec<SharedSegment> {
    segments
        .iter()
        .flat_map(|segment| {
            let start = segment.start();
            let middle = start + (segment.end() - start) / 2;
            [
                Segment::shared(start, middle),
                Segment::shared(middle, segment.end()),
            ]
        })
        .collect()
}

/// Bisects every segment at its byte midpoint, `factor` rounds in a row,
/// producing `len * 2^factor` segments.
///
/// Returns the input unchanged when `factor` is zero or when the list already
/// holds more than `factor` segments. Halves are fresh, available segments
/// starting at each segment's current cursor.
pub fn inflate(segments: Vec<SharedSegment>, factor: usize) -> Vec<SharedSegment> {
    if factor == 0 || segments.len() > factor {
        return segments;
    }

    (0..factor).fold(segments, |inflated, _| bisect(&inflated))
}

/// Merges runs of contiguous segments (`previous.end == next.start`).
///
/// Merged runs become fresh, available segments; segments with no neighbour
/// to merge with are returned as they are. The covered bytes never change.
pub fn compress(segments: &[SharedSegment]) -> Vec<SharedSegment> {
    let mut result: Vec<SharedSegment> = Vec::with_capacity(segments.len());

    for segment in segments {
        match result.last_mut() {
            Some(last) if last.end() == segment.start() => {
                *last = Segment::shared(last.start(), segment.end());
            }
            _ => result.push(segment.clone()),
        }
    }

    result
}

/// Splits an ordered list into `n` ordered parts carrying the same number of
/// remaining bytes.
///
/// Shares differ by at most one byte; the first `total % n` parts get the
/// extra one. A segment straddling a share boundary is cut there into fresh
/// segments, while segments that fit whole are kept as they are. When fewer
/// bytes than parts remain the trailing parts are empty. `n == 0` is treated
/// as 1.
pub fn balance(segments: &[SharedSegment], n: usize) -> Vec<Vec<SharedSegment>> {
    let n = n.max(1) as u64;
    let total: u64 = segments.iter().map(|segment| segment.remaining()).sum();
    let base = total / n;
    let extra = total % n;

    let mut parts = Vec::with_capacity(n as usize);
    let mut iter = segments.iter().filter(|segment| !segment.is_exhausted());
    let mut current = iter.next().map(|segment| (segment, segment.start()));

    for index in 0..n {
        let mut quota = base + u64::from(index < extra);
        let mut part = Vec::new();

        while quota > 0 {
            let Some((segment, position)) = current else {
                break;
            };
            let take = quota.min(segment.end() - position);
            if position == segment.start() && take == segment.remaining() {
                part.push(segment.clone());
            } else {
                part.push(Segment::shared(position, position + take));
            }
            quota -= take;

            current = if position + take == segment.end() {
                iter.next().map(|following| (following, following.start()))
            } else {
                Some((segment, position + take))
            };
        }

        parts.push(part);
    }

    parts
}

/// Turns the remaining segments of a download into one partition per worker.
///
/// Exhausted segments are dropped and the rest are reset to
/// [`SegmentState::Available`]. The remaining bytes are then dealt evenly
/// with [`balance`], each part is compressed, and parts left empty are
/// removed, so the result may hold fewer partitions than `workers`.
pub fn allocate(segments: Vec<SharedSegment>, workers: usize) -> Vec<Vec<SharedSegment>> {
    let pending: Vec<SharedSegment> = segments
        .into_iter()
        .filter(|segment| !segment.is_exhausted())
        .inspect(|segment| segment.set_state(SegmentState::Available))
        .collect();

    balance(&pending, workers)
        .iter()
        .map(|part| compress(part))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Convenience wrapper producing shared segments for `[start, end)`.
pub fn generate_shared(start: u64, end: u64, segment_size: u64) -> Vec<SharedSegment> {
    generate(start, end, segment_size).map(Arc::new).collect()
}
