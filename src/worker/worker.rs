//! The download worker.
//!
//! A worker owns one partition of segments. It claims them in order, fetches
//! each one with a ranged GET from a randomly chosen mirror and pushes the
//! body into the chunk queue, `buffer_size` bytes at a time. It never touches
//! the output file or the segment cursors; that is the write coordinator's
//! job.

use super::chunk::Chunk;
use crate::error::{Error, Result};
use crate::segment::{next, SegmentState, SharedSegment};
use crate::utils::range_header;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use rand::Rng;
use reqwest::{header::RANGE, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Tuning shared by every worker of a download.
#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    /// Bytes accumulated before a chunk is queued.
    pub buffer_size: usize,
    /// Consecutive attempts without progress after which a segment is given
    /// up for this run.
    pub segment_retries: u32,
    /// Pause after a failed attempt.
    pub retry_backoff: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            buffer_size: 256 * 1024,
            segment_retries: 10,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// What a worker did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    /// Segments fully produced.
    pub finished: usize,
    /// Segments given up, their missing bytes left for a later resume.
    pub abandoned: usize,
    /// Failed attempts over all segments.
    pub failed_attempts: u32,
}

/// Downloads the segments of one partition.
pub struct DownloadWorker {
    id: usize,
    client: ClientWithMiddleware,
    urls: Arc<[Url]>,
    partition: Vec<SharedSegment>,
    queue: mpsc::Sender<Chunk>,
    options: WorkerOptions,
}

impl DownloadWorker {
    pub fn new(
        id: usize,
        client: ClientWithMiddleware,
        urls: Arc<[Url]>,
        partition: Vec<SharedSegment>,
        queue: mpsc::Sender<Chunk>,
        options: WorkerOptions,
    ) -> Self {
        Self {
            id,
            client,
            urls,
            partition,
            queue,
            options,
        }
    }

    /// Claims and downloads segments until the partition is done.
    ///
    /// Dropping the worker at the end releases its queue sender.
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };
        let retries = self.options.segment_retries.max(1);

        while let Some(segment) = next(&self.partition) {
            let url = self.pick_url();
            let cursor = segment.start();
            match self.download_segment(&segment, &url).await {
                Ok(()) => {
                    segment.set_state(SegmentState::FinishedProducing);
                    report.finished += 1;
                }
                Err(Error::QueueClosed) => {
                    warn!(worker = self.id, "Chunk queue closed, stopping");
                    segment.set_state(SegmentState::InProgress);
                    break;
                }
                Err(e) if e.is_retryable() => {
                    report.failed_attempts += 1;
                    // Give the writer time to catch up before judging the attempt.
                    tokio::time::sleep(self.options.retry_backoff).await;
                    if segment.start() > cursor {
                        segment.reset_failures();
                        debug!(
                            worker = self.id,
                            %url,
                            from = cursor,
                            to = segment.start(),
                            error = %e,
                            "Segment attempt cut short, resuming"
                        );
                        segment.set_state(SegmentState::InProgress);
                        continue;
                    }

                    let failures = segment.record_failure();
                    if failures >= retries {
                        warn!(
                            worker = self.id,
                            start = segment.start(),
                            end = segment.end(),
                            failures,
                            error = %e,
                            "Giving up on segment"
                        );
                        segment.abandon();
                        report.abandoned += 1;
                    } else {
                        debug!(
                            worker = self.id,
                            %url,
                            start = segment.start(),
                            failures,
                            error = %e,
                            "Segment attempt failed, retrying"
                        );
                        segment.set_state(SegmentState::InProgress);
                    }
                }
                Err(e) => {
                    error!(worker = self.id, %url, error = %e, "Segment cannot be downloaded");
                    segment.abandon();
                    report.abandoned += 1;
                }
            }
        }

        debug!(
            worker = self.id,
            finished = report.finished,
            abandoned = report.abandoned,
            "Worker done"
        );
        report
    }

    fn pick_url(&self) -> Url {
        let index = rand::rng().random_range(0..self.urls.len());
        self.urls[index].clone()
    }

    /// Fetches `[start, end)` of `segment` and queues it.
    ///
    /// Bytes already buffered when the stream fails are still queued, so the
    /// next attempt resumes from wherever the writer got.
    async fn download_segment(&self, segment: &SharedSegment, url: &Url) -> Result<()> {
        let start = segment.start();
        let end = segment.end();

        segment.set_state(SegmentState::InProgress);
        let response = self
            .client
            .get(url.clone())
            .header(RANGE, range_header(start, end))
            .send()
            .await?;

        // A plain 200 carries the whole file.
        let mut skip = match response.status() {
            StatusCode::PARTIAL_CONTENT => 0,
            StatusCode::OK => start,
            status => {
                return Err(Error::BadResponse {
                    status,
                    url: url.to_string(),
                })
            }
        };

        let buffer_size = self.options.buffer_size.max(1);
        let mut buffer = BytesMut::with_capacity(buffer_size);
        let mut offset = start;
        let mut produced = start;
        let mut stream = response.bytes_stream();

        while produced < end {
            let bytes = match stream.next().await {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => {
                    self.flush(segment, &mut buffer, &mut offset).await?;
                    return Err(e.into());
                }
                None => break,
            };

            let mut rest = clip(bytes, &mut skip, end - produced);
            while !rest.is_empty() {
                let take = (buffer_size - buffer.len()).min(rest.len());
                buffer.extend_from_slice(&rest.split_to(take));
                produced += take as u64;
                if buffer.len() >= buffer_size {
                    self.flush(segment, &mut buffer, &mut offset).await?;
                    buffer.reserve(buffer_size);
                }
            }
        }

        self.flush(segment, &mut buffer, &mut offset).await?;

        if produced < end {
            return Err(Error::Incomplete {
                url: url.to_string(),
                received: produced - start,
                expected: end - start,
            });
        }
        Ok(())
    }

    async fn flush(&self, segment: &SharedSegment, buffer: &mut BytesMut, offset: &mut u64) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let chunk = Chunk::new(segment.clone(), *offset, buffer.split().freeze());
        *offset = chunk.end();
        self.queue.send(chunk).await.map_err(|_| Error::QueueClosed)
    }
}

/// Drops the first `skip` bytes (decrementing it) and caps the rest at `room`.
fn clip(bytes: Bytes, skip: &mut u64, room: u64) -> Bytes {
    let skipped = (*skip).min(bytes.len() as u64) as usize;
    *skip -= skipped as u64;
    let bytes = bytes.slice(skipped..);

    if bytes.len() as u64 > room {
        bytes.slice(..room as usize)
    } else {
        bytes
    }
}
