pub mod commands;
pub mod logging;
pub mod progress;

use camino::Utf8PathBuf;
use drivesync_config::{Config, ConfigError};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub credentials: Option<Utf8PathBuf>,
    pub download_dir: Option<Utf8PathBuf>,
    pub interval: Option<u64>,
    pub threads: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(path) = &self.credentials {
            config.credentials_file = path.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(secs) = self.interval {
            config.loop_interval = secs;
        }
        if let Some(threads) = self.threads {
            config.max_concurrent_downloads = threads;
        }
        config.validated()
    }
}

/// How the process should end after an error reached `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Startup could not complete; exit non-zero.
    Fatal,
    /// Should have been contained by the sync loop; logged and still fatal at
    /// this level because nothing is left to retry it.
    Unexpected,
}

pub fn classify(err: &anyhow::Error) -> ErrorClass {
    if let Some(e) = err.downcast_ref::<drivesync_pipeline::SyncError>() {
        if e.is_fatal() {
            return ErrorClass::Fatal;
        }
        return ErrorClass::Unexpected;
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return ErrorClass::Fatal;
    }
    ErrorClass::Unexpected
}
