use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

pub mod filter;
pub mod path_utils;

pub use filter::{filter_eligible, FilterSet, Filtered};

/// Mime type Drive assigns to folder objects.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Opaque identifier of a remote folder, as supplied in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One child of a remote folder as returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl RemoteEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// A single file transfer planned for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub id: u64,
    pub remote_id: String,
    pub name: String,
    pub destination: Utf8PathBuf,
    pub expected_size: Option<u64>,
}

/// Lifecycle of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    InProgress { percent: u8 },
    Complete,
    Failed { reason: String },
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadState::Complete | DownloadState::Failed { .. })
    }
}

/// Whole-number percentage that never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    percent: u8,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Feed a completion fraction. Returns the new percent when it grew.
    pub fn observe(&mut self, fraction: f64) -> Option<u8> {
        let raw = if fraction.is_nan() {
            0.0
        } else {
            (fraction * 100.0).floor().clamp(0.0, 100.0)
        };
        let pct = raw as u8;
        if pct > self.percent {
            self.percent = pct;
            Some(pct)
        } else {
            None
        }
    }

    /// Marks the transfer done. Returns `Some(100)` unless 100 was already reported.
    pub fn finish(&mut self) -> Option<u8> {
        if self.percent < 100 {
            self.percent = 100;
            Some(100)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut p = Progress::new();
        assert_eq!(p.observe(0.255), Some(25));
        assert_eq!(p.observe(0.1), None);
        assert_eq!(p.percent(), 25);
        assert_eq!(p.observe(1.7), Some(100));
        assert_eq!(p.observe(f64::NAN), None);
        assert_eq!(p.finish(), None);
    }

    #[test]
    fn finish_reports_hundred_once() {
        let mut p = Progress::new();
        p.observe(0.5);
        assert_eq!(p.finish(), Some(100));
        assert_eq!(p.finish(), None);
    }

    #[test]
    fn remote_entry_parses_drive_listing_shape() {
        let entry: RemoteEntry = serde_json::from_str(
            r#"{"id":"abc","name":"notes.txt","mimeType":"text/plain","size":12}"#,
        )
        .unwrap();
        assert_eq!(entry.size, Some(12));
        assert!(!entry.is_folder());
    }
}
