/// Directory (inside the destination) holding in-progress downloads.
pub const STAGING_DIR: &str = ".drivesync-staging";

/// Suffix appended to staged file names.
pub const STAGING_SUFFIX: &str = ".part";

pub struct RemoteName;

impl RemoteName {
    /// A remote file name is used verbatim as the local file name, so it must not
    /// be able to address anything outside the destination directory.
    pub fn verify_safe(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && name != STAGING_DIR
            && !name.contains('/')
            && !name.contains('\\')
            && !name.contains('\0')
    }

    /// File name of the staging copy for `name`.
    pub fn staged(name: &str) -> String {
        format!("{name}{STAGING_SUFFIX}")
    }
}
