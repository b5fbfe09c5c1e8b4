mod io_utils;
pub mod bootstrap;
pub mod error;
pub mod scheduler;
pub mod sync;

pub use bootstrap::{drive_scheduler, scheduler_with_store};
pub use error::SyncError;
pub use scheduler::Scheduler;
pub use sync::{
    ChunkedDownloader, CycleReport, DownloadEvent, DownloadOutcome, FileFailure, FolderOutcome,
    FolderReport, LocalManifest, MediaStream, RemoteStore, SyncCycle,
};

// Re-export domain types often needed by consumers
pub use drivesync_core::{DownloadState, FolderId, RemoteEntry};
