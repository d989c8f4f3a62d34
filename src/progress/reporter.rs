//! The progress reporter.
//!
//! A background task that samples [`DownloadMetadata::percentage`] every
//! `interval` and reports it whenever it changes: on the progress bar, to an
//! optional callback and as a `debug` event.

use super::style::ProgressBarOpts;
use crate::metadata::DownloadMetadata;

use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Called with the new percentage (0 to 100) whenever it changes.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Handle on a running reporter task.
#[derive(Debug)]
pub struct ProgressReporter {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Option<u8>>,
}

struct Sink {
    bar: ProgressBar,
    clear: bool,
    on_progress: Option<ProgressCallback>,
    last: Option<u8>,
}

impl Sink {
    fn emit(&mut self, percentage: u8) {
        if self.last == Some(percentage) {
            return;
        }
        self.last = Some(percentage);

        self.bar.set_position(percentage.into());
        if let Some(callback) = &self.on_progress {
            callback(percentage);
        }
        debug!(percentage, "Download progress");
    }

    fn finish(&self) {
        if self.clear {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish();
        }
    }
}

impl ProgressReporter {
    /// Starts reporting the progress of `metadata`.
    pub fn spawn(
        metadata: Arc<DownloadMetadata>,
        interval: Duration,
        opts: &ProgressBarOpts,
        on_progress: Option<ProgressCallback>,
    ) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();
        let mut sink = Sink {
            bar: opts.to_progress_bar(),
            clear: opts.clears(),
            on_progress,
            last: None,
        };
        let interval = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => sink.emit(metadata.percentage()),
                    _ = &mut stopped => break,
                }
            }

            sink.emit(metadata.percentage());
            sink.finish();
            sink.last
        });

        Self {
            stop: Some(stop),
            handle,
        }
    }

    /// Stops the task after one last report and returns the last percentage
    /// reported, if any.
    pub async fn stop(mut self) -> Option<u8> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match self.handle.await {
            Ok(last) => last,
            Err(e) => {
                warn!(error = %e, "Progress reporter task failed");
                None
            }
        }
    }
}
