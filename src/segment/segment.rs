//! The segment type and the claim operation.
//!
//! A [`Segment`] is a half-open byte range `[start, end)` of the target file
//! plus a [`SegmentState`]. Segments are shared as [`SharedSegment`]
//! (`Arc<Segment>`) between a worker's partition, the chunks in flight and
//! the metadata's flat segment list, so every holder sees the same cursor and
//! state.
//!
//! Two fields are mutable and each has a single owner:
//!
//! - `state` moves through compare-and-swap when claimed ([`next`]) and by
//!   plain stores from the worker currently holding the segment.
//! - `start` is the resume cursor. Only the write coordinator moves it, and
//!   only forward over bytes that reached the disk ([`Segment::advance`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// A segment shared between its partition, its chunks and the metadata.
pub type SharedSegment = Arc<Segment>;

/// The state of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SegmentState {
    /// Waiting to be claimed.
    Available = 0,
    /// Claimed by a worker, request not sent yet.
    Allocated = 1,
    /// A request is outstanding, or a previous attempt was abandoned and the
    /// segment is waiting to be claimed again.
    InProgress = 2,
    /// Every byte up to `end` has been produced, or the segment was given up.
    FinishedProducing = 3,
}

impl SegmentState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SegmentState::Available,
            1 => SegmentState::Allocated,
            2 => SegmentState::InProgress,
            _ => SegmentState::FinishedProducing,
        }
    }

    /// Whether a worker may claim a segment in this state.
    pub fn is_claimable(self) -> bool {
        matches!(self, SegmentState::Available | SegmentState::InProgress)
    }
}

/// A byte range of the output file and its download state.
pub struct Segment {
    start: AtomicU64,
    end: u64,
    state: AtomicU8,
    failures: AtomicU32,
}

impl Segment {
    /// Creates an [`SegmentState::Available`] segment covering `[start, end)`.
    ///
    /// `start` is clamped to `end` so the range is never inverted.
    pub fn new(start: u64, end: u64) -> Self {
        Self::with_state(start, end, SegmentState::Available)
    }

    /// Creates a segment with an explicit state, as restored from a snapshot.
    pub fn with_state(start: u64, end: u64, state: SegmentState) -> Self {
        Self {
            start: AtomicU64::new(start.min(end)),
            end,
            state: AtomicU8::new(state as u8),
            failures: AtomicU32::new(0),
        }
    }

    /// Creates a new shared, available segment.
    pub fn shared(start: u64, end: u64) -> SharedSegment {
        Arc::new(Self::new(start, end))
    }

    /// The resume cursor: the first byte that still has to reach the disk.
    pub fn start(&self) -> u64 {
        self.start.load(Ordering::Acquire)
    }

    /// The exclusive end of the segment.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Bytes left between the cursor and the end.
    pub fn remaining(&self) -> u64 {
        self.end - self.start()
    }

    /// A segment whose cursor reached its end has nothing left to fetch.
    pub fn is_exhausted(&self) -> bool {
        self.start() >= self.end
    }

    pub fn state(&self) -> SegmentState {
        SegmentState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: SegmentState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: SegmentState, to: SegmentState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Gives the segment up for this run.
    ///
    /// The cursor is untouched, so the missing bytes are fetched again by a
    /// future resume.
    pub fn abandon(&self) {
        self.set_state(SegmentState::FinishedProducing);
    }

    /// Records a failed attempt and returns how many attempts in a row failed.
    pub fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Forgets earlier failures once an attempt moved the cursor.
    pub fn reset_failures(&self) {
        self.failures.store(0, Ordering::Release);
    }

    /// Consecutive failed attempts during this run. Not persisted.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    /// Moves the cursor over `[offset, offset + len)` once those bytes are on
    /// disk, and returns how many new bytes became durable.
    ///
    /// The cursor only moves contiguously: bytes at or behind the cursor are
    /// not counted twice, and a range starting beyond the cursor leaves it in
    /// place, since the bytes in between never made it to disk.
    pub fn advance(&self, offset: u64, len: u64) -> u64 {
        let target = offset.saturating_add(len).min(self.end);
        let mut current = self.start.load(Ordering::Acquire);
        loop {
            if offset > current || target <= current {
                return 0;
            }
            match self.start.compare_exchange_weak(
                current,
                target,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return target - current,
                Err(observed) => current = observed,
            }
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("start", &self.start())
            .field("end", &self.end)
            .field("state", &self.state())
            .finish()
    }
}

/// Claims the next segment of a partition.
///
/// Scans the partition in order and returns the first segment that is
/// [`SegmentState::Available`] or [`SegmentState::InProgress`] with bytes
/// left, after atomically moving it to [`SegmentState::Allocated`].
/// Claimable segments with nothing left are marked
/// [`SegmentState::FinishedProducing`] on the way. `None` means the
/// partition is done.
pub fn next(partition: &[SharedSegment]) -> Option<SharedSegment> {
    for segment in partition {
        loop {
            let state = segment.state();
            if !state.is_claimable() {
                break;
            }
            if segment.is_exhausted() {
                if segment.transition(state, SegmentState::FinishedProducing) {
                    break;
                }
                continue;
            }
            if segment.transition(state, SegmentState::Allocated) {
                return Some(segment.clone());
            }
        }
    }

    None
}
