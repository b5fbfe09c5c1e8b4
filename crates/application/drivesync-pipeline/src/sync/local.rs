use camino::{Utf8Path, Utf8PathBuf};
use drivesync_core::path_utils::{RemoteName, STAGING_DIR};

/// The set of already-downloaded names, read straight from the destination
/// directory. There is no separate index: presence on disk is the record.
#[derive(Debug, Clone)]
pub struct LocalManifest {
    root: Utf8PathBuf,
}

impl LocalManifest {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn destination(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub fn staging_dir(&self) -> Utf8PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn staging_path(&self, name: &str) -> Utf8PathBuf {
        self.staging_dir().join(RemoteName::staged(name))
    }

    /// Whether anything already occupies `name` in the destination directory.
    pub async fn contains(&self, name: &str) -> std::io::Result<bool> {
        tokio::fs::try_exists(self.destination(name).as_std_path()).await
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.as_std_path()).await
    }
}

/// Staging location for a final destination path.
pub(crate) fn staging_path_for(destination: &Utf8Path) -> Option<Utf8PathBuf> {
    let parent = destination.parent()?;
    let name = destination.file_name()?;
    Some(parent.join(STAGING_DIR).join(RemoteName::staged(name)))
}
