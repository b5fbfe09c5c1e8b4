use drivesync_core::{FolderId, RemoteEntry};
use drivesync_infra::{DriveClient, DriveMediaStream, MediaChunk, RemoteError};

/// Incremental reader over one remote file.
#[async_trait::async_trait]
pub trait MediaStream: Send {
    /// Next chunk, or `None` once the stream is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<MediaChunk>, RemoteError>;
}

/// The remote side of the mirror.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// `Ok(false)` when the id is missing, inaccessible or not a folder.
    async fn validate_folder(&self, folder: &FolderId) -> Result<bool, RemoteError>;
    /// Non-trashed children of `folder`.
    async fn list_children(&self, folder: &FolderId) -> Result<Vec<RemoteEntry>, RemoteError>;
    async fn open_media(&self, remote_id: &str) -> Result<Box<dyn MediaStream>, RemoteError>;
}

#[async_trait::async_trait]
impl MediaStream for DriveMediaStream {
    async fn next_chunk(&mut self) -> Result<Option<MediaChunk>, RemoteError> {
        DriveMediaStream::next_chunk(self).await
    }
}

#[async_trait::async_trait]
impl RemoteStore for DriveClient {
    async fn validate_folder(&self, folder: &FolderId) -> Result<bool, RemoteError> {
        DriveClient::validate_folder(self, folder).await
    }

    async fn list_children(&self, folder: &FolderId) -> Result<Vec<RemoteEntry>, RemoteError> {
        DriveClient::list_children(self, folder).await
    }

    async fn open_media(&self, remote_id: &str) -> Result<Box<dyn MediaStream>, RemoteError> {
        let stream = DriveClient::open_media(self, remote_id)?;
        Ok(Box::new(stream))
    }
}
