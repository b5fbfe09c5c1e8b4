use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::sync::{CycleReport, DownloadEvent, SyncCycle};

/// Runs the sync cycle, waits a fixed interval, repeats.
///
/// There is no jitter and no catch-up: a long cycle simply pushes the next one
/// back. Cancellation is observed before each cycle and during the wait; a
/// cycle already in progress runs to completion.
pub struct Scheduler {
    cycle: SyncCycle,
    interval: Duration,
}

impl Scheduler {
    pub fn new(cycle: SyncCycle, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run_once(&self, tx: Option<Sender<DownloadEvent>>) -> CycleReport {
        let report = self.cycle.run(tx).await;
        log_summary(&report);
        report
    }

    /// Loops until `cancel` fires. Returns the number of completed cycles.
    pub async fn run<F>(
        &self,
        cancel: CancellationToken,
        tx: Option<Sender<DownloadEvent>>,
        mut on_report: F,
    ) -> u64
    where
        F: FnMut(&CycleReport),
    {
        let mut cycles = 0u64;
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let report = self.run_once(tx.clone()).await;
            cycles += 1;
            on_report(&report);

            tracing::info!(
                "Waiting for {} seconds before next check...",
                self.interval.as_secs()
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!(cycles, "scheduler stopped");
        cycles
    }
}

fn log_summary(report: &CycleReport) {
    tracing::info!(
        folders = report.folders.len(),
        downloaded = report.downloaded(),
        already_present = report.skipped_existing(),
        failed = report.failed(),
        folder_errors = report.folder_errors(),
        elapsed_ms = report.duration().num_milliseconds(),
        "sync cycle finished"
    );
}
