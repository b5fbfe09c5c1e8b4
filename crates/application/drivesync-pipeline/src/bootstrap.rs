use std::sync::Arc;
use std::time::Duration;

use drivesync_config::Config;
use drivesync_infra::{default_http_client, DriveClient, ServiceAccountTokens, TokenProvider};

use crate::scheduler::Scheduler;
use crate::sync::{RemoteStore, SyncCycle};
use crate::SyncError;

/// Wires a scheduler against Google Drive. Everything that can go wrong here
/// is a startup error.
pub async fn drive_scheduler(config: &Config) -> Result<Scheduler, SyncError> {
    tokio::fs::create_dir_all(config.download_dir.as_std_path())
        .await
        .map_err(|source| SyncError::DownloadDir {
            path: config.download_dir.clone(),
            source,
        })?;

    let tokens: Arc<dyn TokenProvider> = Arc::new(
        ServiceAccountTokens::from_key_file(&config.credentials_file)
            .await
            .map_err(SyncError::Credentials)?,
    );
    let http = default_http_client(Duration::from_secs(config.request_timeout_secs))
        .map_err(|e| SyncError::HttpClient(e.to_string()))?;
    let store: Arc<dyn RemoteStore> =
        Arc::new(DriveClient::new(http, tokens, config.chunk_size_bytes));

    Ok(scheduler_with_store(store, config))
}

/// Scheduler over an arbitrary remote store.
pub fn scheduler_with_store(store: Arc<dyn RemoteStore>, config: &Config) -> Scheduler {
    let cycle = SyncCycle::new(store, config);
    Scheduler::new(cycle, Duration::from_secs(config.loop_interval))
}
