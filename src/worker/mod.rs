//! Worker module containing the producers of the chunk queue.
//!
//! - `worker` - [`DownloadWorker`]: claims segments, issues range requests, queues chunks
//! - `chunk` - [`Chunk`]: downloaded bytes tagged with their segment and offset

pub mod chunk;
pub mod worker;

pub use chunk::Chunk;
pub use worker::{DownloadWorker, WorkerOptions, WorkerReport};
