use camino::Utf8PathBuf;
use drivesync_config::ConfigError;
use drivesync_infra::RemoteError;

/// Errors crossing the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("credentials: {0}")]
    Credentials(RemoteError),
    #[error("download directory {path}: {source}")]
    DownloadDir {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("http client: {0}")]
    HttpClient(String),
    #[error("remote: {0}")]
    Remote(#[from] RemoteError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsafe remote file name {0:?}")]
    UnsafeName(String),
}

impl SyncError {
    /// Startup problems the loop cannot recover from by waiting for the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_)
                | SyncError::Credentials(_)
                | SyncError::DownloadDir { .. }
                | SyncError::HttpClient(_)
        )
    }
}
