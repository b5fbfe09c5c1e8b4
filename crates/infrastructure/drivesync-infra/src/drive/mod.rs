//! Google Drive REST v3 client: folder validation, listing and ranged media reads.

use std::sync::Arc;

use drivesync_core::{FolderId, RemoteEntry, FOLDER_MIME_TYPE};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::auth::TokenProvider;
use crate::error::RemoteError;

mod media;

pub use media::{DriveMediaStream, MediaChunk};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const LIST_PAGE_SIZE: &str = "1000";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size)";

#[derive(Clone)]
pub struct DriveClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    base: String,
    chunk_size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMeta {
    #[serde(default)]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    // Drive encodes int64 fields as JSON strings.
    #[serde(default)]
    size: Option<String>,
}

impl From<DriveFile> for RemoteEntry {
    fn from(f: DriveFile) -> Self {
        RemoteEntry {
            size: f.size.and_then(|s| s.parse().ok()),
            id: f.id,
            name: f.name,
            mime_type: f.mime_type,
        }
    }
}

impl DriveClient {
    pub fn new(client: Client, tokens: Arc<dyn TokenProvider>, chunk_size: u64) -> Self {
        Self {
            client,
            tokens,
            base: DRIVE_API_BASE.to_string(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Points the client at a different API root (e.g. a local test server).
    pub fn with_base_url(mut self, base: &str) -> Result<Self, RemoteError> {
        Url::parse(base).map_err(|e| RemoteError::InvalidUrl(format!("{base}: {e}")))?;
        self.base = base.to_string();
        Ok(self)
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// `files` or `files/{id}` under the API root.
    fn files_url(&self, file_id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {e}", self.base)))?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(format!("cannot-be-a-base url {}", self.base)))?;
            segs.pop_if_empty();
            segs.push("files");
            if let Some(id) = file_id {
                segs.push(id);
            }
        }
        Ok(url)
    }

    /// True only for an existing folder. 403/404 mean "not a usable folder" and
    /// are answered with `false`; any other failure is an error.
    pub async fn validate_folder(&self, folder: &FolderId) -> Result<bool, RemoteError> {
        let url = self.files_url(Some(folder.as_str()))?;
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "id, mimeType"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
                tracing::debug!(folder = %folder, status = %resp.status(), "folder lookup refused");
                Ok(false)
            }
            s if s.is_success() => {
                let meta: FileMeta = resp.json().await?;
                Ok(meta.mime_type == FOLDER_MIME_TYPE)
            }
            _ => Err(status_error(resp).await),
        }
    }

    /// Every non-trashed child of `folder`, following pagination to the end.
    pub async fn list_children(&self, folder: &FolderId) -> Result<Vec<RemoteEntry>, RemoteError> {
        let url = self.files_url(None)?;
        let query = format!("'{}' in parents and trashed=false", escape_query(folder.as_str()));
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.tokens.access_token().await?;
            let mut req = self
                .client
                .get(url.clone())
                .bearer_auth(token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", LIST_FIELDS),
                    ("pageSize", LIST_PAGE_SIZE),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ]);
            if let Some(pt) = &page_token {
                req = req.query(&[("pageToken", pt.as_str())]);
            }

            let resp = req.send().await?;
            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }
            let page: FileListPage = resp.json().await?;
            entries.extend(page.files.into_iter().map(RemoteEntry::from));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(folder = %folder, count = entries.len(), "listed folder");
        Ok(entries)
    }

    /// Chunked reader over the media content of `file_id`. No request is made
    /// until the first chunk is pulled.
    pub fn open_media(&self, file_id: &str) -> Result<DriveMediaStream, RemoteError> {
        let mut url = self.files_url(Some(file_id))?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("supportsAllDrives", "true");
        Ok(DriveMediaStream::new(
            self.client.clone(),
            self.tokens.clone(),
            url,
            self.chunk_size,
        ))
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub(crate) async fn status_error(resp: Response) -> RemoteError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    RemoteError::Status { status, body }
}
