//! Runtime configuration: the JSON config file and the limits applied to it.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Default seconds between the end of one cycle and the start of the next.
pub const DEFAULT_LOOP_INTERVAL_SECS: u64 = 60;

/// Default number of concurrent downloads. One keeps transfers strictly sequential.
pub const DEFAULT_DOWNLOAD_THREADS: usize = 1;

/// Minimum allowed concurrent downloads.
pub const MIN_DOWNLOAD_THREADS: usize = 1;

/// Maximum allowed concurrent downloads.
pub const MAX_DOWNLOAD_THREADS: usize = 8;

/// Default ranged-request size for media downloads. 8 MiB.
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 8 * 1024 * 1024;

/// Smallest accepted chunk size. 256 KiB.
pub const MIN_CHUNK_SIZE_BYTES: u64 = 256 * 1024;

/// Default per-request network timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_CONFIG_FILE: &str = "./config.json";
pub const DEFAULT_CREDENTIALS_FILE: &str = "./service-account.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";

/// Convenience function to clamp a thread value into allowed range.
pub fn clamp_threads(v: usize) -> usize {
    v.clamp(MIN_DOWNLOAD_THREADS, MAX_DOWNLOAD_THREADS)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(Utf8PathBuf),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where downloaded files land relative to the download directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Every folder writes into the download directory itself; the first folder
    /// to provide a given file name wins.
    #[default]
    Flat,
    /// Each folder writes into `<download_dir>/<folder_id>/`.
    PerFolder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub folder_ids: Vec<String>,
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_loop_interval")]
    pub loop_interval: u64,
    #[serde(default = "default_download_dir")]
    pub download_dir: Utf8PathBuf,
    #[serde(default = "default_credentials_file")]
    pub credentials_file: Utf8PathBuf,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_threads")]
    pub max_concurrent_downloads: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub rate_limit_bytes: Option<u64>,
}

fn default_loop_interval() -> u64 {
    DEFAULT_LOOP_INTERVAL_SECS
}

fn default_download_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

fn default_credentials_file() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CREDENTIALS_FILE)
}

fn default_threads() -> usize {
    DEFAULT_DOWNLOAD_THREADS
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE_BYTES
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    /// Reads, parses and validates the config file at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validated()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: Utf8PathBuf::from("<inline>"),
            source,
        })?;
        config.validated()
    }

    /// Checks invariants and normalizes clamped values.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.folder_ids.is_empty() {
            return Err(ConfigError::Invalid("folder_ids must not be empty".into()));
        }
        if self.folder_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid("folder_ids contains an empty id".into()));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "allowed_extensions must not be empty".into(),
            ));
        }
        if self.allowed_extensions.iter().any(|e| e.is_empty()) {
            return Err(ConfigError::Invalid(
                "allowed_extensions contains an empty extension".into(),
            ));
        }
        if self.loop_interval == 0 {
            return Err(ConfigError::Invalid("loop_interval must be at least 1".into()));
        }
        if self.chunk_size_bytes < MIN_CHUNK_SIZE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "chunk_size_bytes must be at least {MIN_CHUNK_SIZE_BYTES}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.rate_limit_bytes == Some(0) {
            self.rate_limit_bytes = None;
        }
        self.max_concurrent_downloads = clamp_threads(self.max_concurrent_downloads);
        Ok(self)
    }
}
