//! The write coordinator: single consumer of the chunk queue and the only
//! writer of the output file.

use crate::error::Result;
use crate::metadata::DownloadMetadata;
use crate::worker::Chunk;

use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error};

/// What the coordinator wrote before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub chunks_written: usize,
    /// Every byte written, re-fetched ones included.
    pub bytes_written: u64,
    /// Bytes that moved a segment cursor.
    pub bytes_counted: u64,
    pub write_errors: usize,
}

/// Drains the chunk queue into the output file and keeps the metadata in
/// step with what is on disk.
pub struct WriteCoordinator {
    file: File,
    metadata: Arc<DownloadMetadata>,
    queue: mpsc::Receiver<Chunk>,
    poll_timeout: Duration,
}

impl WriteCoordinator {
    pub fn new(
        file: File,
        metadata: Arc<DownloadMetadata>,
        queue: mpsc::Receiver<Chunk>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            file,
            metadata,
            queue,
            poll_timeout,
        }
    }

    /// Runs until every sender is gone, or until a poll times out while every
    /// segment has finished producing (whatever is still queued is written
    /// first).
    pub async fn run(mut self) -> WriteReport {
        let mut report = WriteReport::default();

        loop {
            match timeout(self.poll_timeout, self.queue.recv()).await {
                Ok(Some(chunk)) => self.handle(chunk, &mut report).await,
                Ok(None) => {
                    debug!("Chunk queue closed");
                    break;
                }
                Err(_) => {
                    if self.metadata.all_finished_producing() {
                        while let Ok(chunk) = self.queue.try_recv() {
                            self.handle(chunk, &mut report).await;
                        }
                        debug!("Every segment finished producing");
                        break;
                    }
                }
            }
        }

        debug!(
            chunks = report.chunks_written,
            bytes = report.bytes_written,
            errors = report.write_errors,
            "Write coordinator done"
        );
        report
    }

    async fn handle(&mut self, chunk: Chunk, report: &mut WriteReport) {
        if let Err(e) = self.write(&chunk).await {
            // The cursor stays behind the missing bytes; a resume fetches them again.
            error!(offset = chunk.offset(), len = chunk.len(), error = %e, "Failed to write chunk");
            report.write_errors += 1;
            return;
        }

        report.chunks_written += 1;
        report.bytes_written += chunk.len();

        let advanced = chunk.segment().advance(chunk.offset(), chunk.len());
        if advanced > 0 {
            report.bytes_counted += advanced;
            self.metadata.record_progress(advanced);
            self.metadata.persist().await;
        }
    }

    async fn write(&mut self, chunk: &Chunk) -> Result<()> {
        self.file.seek(SeekFrom::Start(chunk.offset())).await?;
        self.file.write_all(chunk.data()).await?;
        // Tokio files write in the background; flushing surfaces the error.
        self.file.flush().await?;
        self.file.sync_data().await?;
        Ok(())
    }
}
