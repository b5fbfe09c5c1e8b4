use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::Utc;
use drivesync_config::{Config, Layout};
use drivesync_core::path_utils::RemoteName;
use drivesync_core::{filter_eligible, DownloadState, DownloadTask, FilterSet, FolderId};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc::Sender;

use crate::sync::download::{ChunkedDownloader, DownloadEvent};
use crate::sync::local::LocalManifest;
use crate::sync::remote::RemoteStore;
use crate::sync::report::{CycleReport, FileFailure, FolderOutcome, FolderReport};
use crate::SyncError;

/// One pass over every configured folder: validate, list, filter, download.
///
/// Failures are contained at the smallest unit that produced them. A bad file
/// is recorded and its siblings continue; a bad folder is recorded and the next
/// folder is attempted. `run` itself never fails.
pub struct SyncCycle {
    store: Arc<dyn RemoteStore>,
    downloader: ChunkedDownloader,
    folders: Vec<FolderId>,
    filter: FilterSet,
    download_dir: Utf8PathBuf,
    layout: Layout,
    concurrency: usize,
    next_id: AtomicU64,
}

impl SyncCycle {
    pub fn new(store: Arc<dyn RemoteStore>, config: &Config) -> Self {
        Self {
            downloader: ChunkedDownloader::new(store.clone(), config.rate_limit_bytes),
            store,
            folders: config.folder_ids.iter().map(|id| FolderId::new(id.as_str())).collect(),
            filter: FilterSet::new(config.allowed_extensions.iter().cloned()),
            download_dir: config.download_dir.clone(),
            layout: config.layout,
            concurrency: drivesync_config::clamp_threads(config.max_concurrent_downloads),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn folders(&self) -> &[FolderId] {
        &self.folders
    }

    pub async fn run(&self, tx: Option<Sender<DownloadEvent>>) -> CycleReport {
        let started_at = Utc::now();
        let mut folders = Vec::with_capacity(self.folders.len());

        for folder in &self.folders {
            let report = self.sync_folder(folder, tx.as_ref()).await;
            folders.push(report);
        }

        CycleReport {
            started_at,
            finished_at: Utc::now(),
            folders,
        }
    }

    fn manifest_for(&self, folder: &FolderId) -> Result<LocalManifest, SyncError> {
        match self.layout {
            Layout::Flat => Ok(LocalManifest::new(self.download_dir.clone())),
            Layout::PerFolder => {
                if !RemoteName::verify_safe(folder.as_str()) {
                    return Err(SyncError::UnsafeName(folder.to_string()));
                }
                Ok(LocalManifest::new(self.download_dir.join(folder.as_str())))
            }
        }
    }

    async fn sync_folder(
        &self,
        folder: &FolderId,
        tx: Option<&Sender<DownloadEvent>>,
    ) -> FolderReport {
        let mut report = FolderReport::new(folder.clone());

        match self.store.validate_folder(folder).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("Invalid folder ID: {folder}.");
                report.outcome = FolderOutcome::Invalid;
                return report;
            }
            Err(e) => {
                tracing::error!("Could not validate folder {folder}: {e}");
                report.outcome = FolderOutcome::ValidationFailed(e.to_string());
                return report;
            }
        }

        let entries = match self.store.list_children(folder).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("An error occurred while listing files in {folder}: {e}");
                report.outcome = FolderOutcome::ListFailed(e.to_string());
                Vec::new()
            }
        };
        report.listed = entries.len();

        let filtered = filter_eligible(entries, &self.filter);
        if !filtered.skipped.is_empty() {
            tracing::info!(
                "Skipping files with unsupported extensions: {}",
                filtered.skipped.join(", ")
            );
        }
        report.skipped_extension = filtered.skipped;
        if filtered.kept.is_empty() {
            tracing::info!("No new files found.");
            return report;
        }

        let manifest = match self.manifest_for(folder) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("Cannot map folder {folder} to a local directory: {e}");
                report.outcome = FolderOutcome::LocalDirFailed(e.to_string());
                return report;
            }
        };
        if let Err(e) = manifest.ensure_root().await {
            tracing::error!("Cannot create {}: {e}", manifest.root());
            report.outcome = FolderOutcome::LocalDirFailed(e.to_string());
            return report;
        }

        // Destinations handed to this folder's batch. Folders run one after
        // another, so a finished batch leaves either a file on disk or nothing.
        let mut claims: HashSet<Utf8PathBuf> = HashSet::new();
        let mut tasks = Vec::new();
        for entry in filtered.kept {
            if !RemoteName::verify_safe(&entry.name) {
                tracing::warn!("Refusing unsafe file name {:?} in {folder}", entry.name);
                report.failed.push(FileFailure {
                    reason: SyncError::UnsafeName(entry.name.clone()).to_string(),
                    name: entry.name,
                });
                continue;
            }

            let destination = manifest.destination(&entry.name);
            let present = match manifest.contains(&entry.name).await {
                Ok(present) => present,
                Err(e) => {
                    tracing::warn!("Cannot check {destination}: {e}");
                    report.failed.push(FileFailure {
                        name: entry.name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if present || claims.contains(&destination) {
                tracing::info!("Skipping {} (already downloaded).", entry.name);
                report.skipped_existing.push(entry.name);
                continue;
            }

            claims.insert(destination.clone());
            tasks.push(DownloadTask {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                remote_id: entry.id,
                name: entry.name,
                destination,
                expected_size: entry.size,
            });
        }

        // buffer_unordered(1) keeps listing order.
        let outcomes: Vec<_> = stream::iter(tasks)
            .map(|task| async move {
                let outcome = self.downloader.download(&task, tx).await;
                (task, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (task, outcome) in outcomes {
            match outcome.state {
                DownloadState::Complete => report.downloaded.push(task.name),
                DownloadState::Failed { reason } => report.failed.push(FileFailure {
                    name: task.name,
                    reason,
                }),
                other => report.failed.push(FileFailure {
                    name: task.name,
                    reason: format!("transfer ended in non-terminal state {other:?}"),
                }),
            }
        }

        report
    }
}
