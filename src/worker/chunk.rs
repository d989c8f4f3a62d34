use crate::segment::SharedSegment;

use bytes::Bytes;
use std::fmt;

/// A run of downloaded bytes on its way to the disk.
///
/// The chunk keeps its segment alive so the write coordinator can move the
/// segment's cursor once the bytes are written.
pub struct Chunk {
    segment: SharedSegment,
    offset: u64,
    data: Bytes,
}

impl Chunk {
    pub fn new(segment: SharedSegment, offset: u64, data: Bytes) -> Self {
        Self {
            segment,
            offset,
            data,
        }
    }

    pub fn segment(&self) -> &SharedSegment {
        &self.segment
    }

    /// Absolute position of the first byte in the output file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.len()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("offset", &self.offset)
            .field("len", &self.data.len())
            .field("segment", &self.segment)
            .finish()
    }
}
