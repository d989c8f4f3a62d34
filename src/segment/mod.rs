//! Segment module containing the unit of download work and the algorithms
//! that cut, deal and merge it.
//!
//! # Overview
//!
//! - `segment` - The [`Segment`] type, its [`SegmentState`] and the [`next`] claim operation
//! - `algorithms` - [`generate`], [`partition`], [`balance`], [`inflate`], [`compress`] and [`allocate`]
//!
//! # Examples
//!
//! ```rust
//! use tessera::segment::{compress, generate_shared, next, SegmentState};
//!
//! let segments = generate_shared(0, 10_000, 4096);
//! assert_eq!(segments.len(), 3);
//!
//! let merged = compress(&segments);
//! assert_eq!((merged[0].start(), merged[0].end()), (0, 10_000));
//!
//! let claimed = next(&merged).unwrap();
//! assert_eq!(claimed.state(), SegmentState::Allocated);
//! assert!(next(&merged).is_none());
//! ```

pub mod algorithms;
pub mod segment;

pub use algorithms::{allocate, balance, compress, generate, generate_shared, inflate, partition, Segments};
pub use segment::{next, Segment, SegmentState, SharedSegment};
