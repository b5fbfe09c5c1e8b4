use chrono::{DateTime, Utc};
use drivesync_core::FolderId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// Listed and processed; per-file results are in the report.
    Synced,
    /// The id does not resolve to an accessible folder.
    Invalid,
    /// Validation could not be completed (transport error).
    ValidationFailed(String),
    /// The folder is valid but listing failed.
    ListFailed(String),
    /// The local directory for this folder could not be prepared.
    LocalDirFailed(String),
}

impl FolderOutcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, FolderOutcome::Synced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct FolderReport {
    pub folder: FolderId,
    pub outcome: FolderOutcome,
    pub listed: usize,
    pub downloaded: Vec<String>,
    pub skipped_extension: Vec<String>,
    pub skipped_existing: Vec<String>,
    pub failed: Vec<FileFailure>,
}

impl FolderReport {
    pub fn new(folder: FolderId) -> Self {
        Self {
            folder,
            outcome: FolderOutcome::Synced,
            listed: 0,
            downloaded: Vec::new(),
            skipped_extension: Vec::new(),
            skipped_existing: Vec::new(),
            failed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub folders: Vec<FolderReport>,
}

impl CycleReport {
    pub fn downloaded(&self) -> usize {
        self.folders.iter().map(|f| f.downloaded.len()).sum()
    }

    pub fn skipped_existing(&self) -> usize {
        self.folders.iter().map(|f| f.skipped_existing.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.folders.iter().map(|f| f.failed.len()).sum()
    }

    pub fn folder_errors(&self) -> usize {
        self.folders.iter().filter(|f| f.outcome.is_error()).count()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
