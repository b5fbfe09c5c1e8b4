use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use drivesync_infra::net::backoff;

const MAX_RENAME_ATTEMPTS: u32 = 4;

#[derive(Debug, thiserror::Error)]
#[error("rename {from} -> {to} failed after {attempts} attempt(s): {source}")]
pub struct RenameError {
    pub from: Utf8PathBuf,
    pub to: Utf8PathBuf,
    pub attempts: u32,
    #[source]
    pub source: std::io::Error,
}

/// Moves a finished staging file onto its final name.
///
/// Scanners and indexers briefly lock fresh files on some platforms, so failures
/// are retried on the network backoff schedule. A missing source is final.
pub async fn promote_staged(from: &Utf8Path, to: &Utf8Path) -> Result<(), RenameError> {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match tokio::fs::rename(from.as_std_path(), to.as_std_path()).await {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() != ErrorKind::NotFound && attempts < MAX_RENAME_ATTEMPTS => {
                tracing::debug!(%from, attempts, error = %e, "rename failed, retrying");
                tokio::time::sleep(backoff(attempts)).await;
            }
            Err(source) => {
                return Err(RenameError {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    attempts,
                    source,
                })
            }
        }
    }
}
