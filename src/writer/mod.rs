//! Writer module containing the consumer side of the chunk queue.
//!
//! - `coordinator` - [`WriteCoordinator`]: seek, write, sync, advance cursors, persist

pub mod coordinator;

pub use coordinator::{WriteCoordinator, WriteReport};
