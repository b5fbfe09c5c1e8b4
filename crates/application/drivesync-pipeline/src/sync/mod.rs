pub mod cycle;
pub mod download;
pub mod local;
pub mod remote;
pub mod report;

pub use cycle::SyncCycle;
pub use download::{ChunkedDownloader, DownloadEvent, DownloadOutcome};
pub use local::LocalManifest;
pub use remote::{MediaStream, RemoteStore};
pub use report::{CycleReport, FileFailure, FolderOutcome, FolderReport};
