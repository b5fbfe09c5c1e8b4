use std::num::NonZeroU32;
use std::sync::Arc;

use drivesync_core::{DownloadState, DownloadTask, Progress};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::Sender;

use crate::io_utils::promote_staged;
use crate::sync::local::staging_path_for;
use crate::sync::remote::RemoteStore;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Started {
        id: u64,
        name: String,
        total_bytes: Option<u64>,
    },
    Progress {
        id: u64,
        percent: u8,
        bytes: u64,
    },
    Completed {
        id: u64,
        bytes: u64,
    },
    Failed {
        id: u64,
        bytes: u64,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub id: u64,
    pub state: DownloadState,
    pub bytes_written: u64,
}

/// Drives one remote media stream into a file, chunk by chunk.
///
/// Bytes go to a staging file under the destination's staging directory and
/// are renamed onto the final name only once the stream reports its end and,
/// when the listing gave a size, exactly that many bytes were written. A
/// failed transfer leaves the partial staging file behind and the final name
/// untouched, so the next cycle sees the file as missing and starts over.
///
/// The caller guarantees the destination does not exist and that no other
/// task targets it concurrently.
pub struct ChunkedDownloader {
    store: Arc<dyn RemoteStore>,
    limiter: Option<Arc<Limiter>>,
    burst: u32,
}

impl ChunkedDownloader {
    pub fn new(store: Arc<dyn RemoteStore>, rate_limit_bytes: Option<u64>) -> Self {
        let burst = rate_limit_bytes
            .map(|bps| bps.min(u32::MAX as u64) as u32)
            .unwrap_or(0);
        let limiter = NonZeroU32::new(burst)
            .map(|nz| Arc::new(RateLimiter::direct(Quota::per_second(nz))));
        Self {
            store,
            limiter,
            burst,
        }
    }

    pub async fn download(
        &self,
        task: &DownloadTask,
        tx: Option<&Sender<DownloadEvent>>,
    ) -> DownloadOutcome {
        let mut transfer = Transfer::new(task, tx);
        transfer
            .emit(DownloadEvent::Started {
                id: task.id,
                name: task.name.clone(),
                total_bytes: task.expected_size,
            })
            .await;
        tracing::info!("Downloading: {}", task.name);

        match self.run(&mut transfer).await {
            Ok(()) => {
                transfer.state = DownloadState::Complete;
                transfer
                    .emit(DownloadEvent::Completed {
                        id: task.id,
                        bytes: transfer.written,
                    })
                    .await;
                tracing::info!("Download complete: {}", task.name);
            }
            Err(reason) => {
                tracing::error!(
                    bytes_written = transfer.written,
                    "Download failed: {}: {reason}",
                    task.name
                );
                transfer
                    .emit(DownloadEvent::Failed {
                        id: task.id,
                        bytes: transfer.written,
                        error: reason.clone(),
                    })
                    .await;
                transfer.state = DownloadState::Failed { reason };
            }
        }

        DownloadOutcome {
            id: task.id,
            state: transfer.state,
            bytes_written: transfer.written,
        }
    }

    async fn run(&self, transfer: &mut Transfer<'_>) -> Result<(), String> {
        let task = transfer.task;
        let staging = staging_path_for(&task.destination)
            .ok_or_else(|| format!("destination {} has no file name", task.destination))?;
        if let Some(dir) = staging.parent() {
            tokio::fs::create_dir_all(dir.as_std_path())
                .await
                .map_err(|e| format!("create staging dir {dir}: {e}"))?;
        }

        let mut stream = self
            .store
            .open_media(&task.remote_id)
            .await
            .map_err(|e| e.to_string())?;
        let mut file = File::create(staging.as_std_path())
            .await
            .map_err(|e| format!("create {staging}: {e}"))?;
        transfer.state = DownloadState::InProgress { percent: 0 };

        while let Some(chunk) = stream.next_chunk().await.map_err(|e| e.to_string())? {
            self.throttle(chunk.data.len()).await;
            file.write_all(&chunk.data)
                .await
                .map_err(|e| format!("write {staging}: {e}"))?;
            transfer.written += chunk.data.len() as u64;
            if let Some(percent) = transfer.progress.observe(chunk.fraction) {
                transfer.report_progress(percent).await;
            }
        }
        if let Some(expected) = task.expected_size {
            if transfer.written != expected {
                return Err(format!(
                    "stream ended after {} of {expected} bytes",
                    transfer.written
                ));
            }
        }

        file.flush()
            .await
            .map_err(|e| format!("flush {staging}: {e}"))?;
        file.sync_all()
            .await
            .map_err(|e| format!("sync {staging}: {e}"))?;
        drop(file);

        if let Some(percent) = transfer.progress.finish() {
            transfer.report_progress(percent).await;
        }

        promote_staged(&staging, &task.destination)
            .await
            .map_err(|e| e.to_string())
    }

    async fn throttle(&self, len: usize) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        // Requests larger than the bucket are refused outright, so wait in slices.
        let mut remaining = len as u64;
        while remaining > 0 {
            let n = remaining.min(self.burst as u64) as u32;
            if let Some(nz) = NonZeroU32::new(n) {
                limiter.until_n_ready(nz).await.ok();
            }
            remaining -= n as u64;
        }
    }
}

struct Transfer<'a> {
    task: &'a DownloadTask,
    tx: Option<&'a Sender<DownloadEvent>>,
    state: DownloadState,
    progress: Progress,
    written: u64,
}

impl<'a> Transfer<'a> {
    fn new(task: &'a DownloadTask, tx: Option<&'a Sender<DownloadEvent>>) -> Self {
        Self {
            task,
            tx,
            state: DownloadState::Pending,
            progress: Progress::new(),
            written: 0,
        }
    }

    async fn emit(&self, ev: DownloadEvent) {
        if let Some(tx) = self.tx {
            let _ = tx.send(ev).await;
        }
    }

    async fn report_progress(&mut self, percent: u8) {
        self.state = DownloadState::InProgress { percent };
        tracing::debug!(file = %self.task.name, percent, bytes = self.written, "progress");
        self.emit(DownloadEvent::Progress {
            id: self.task.id,
            percent,
            bytes: self.written,
        })
        .await;
    }
}
