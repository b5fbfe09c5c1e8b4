use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Client, StatusCode, Url};

use crate::auth::TokenProvider;
use crate::error::RemoteError;
use crate::net::backoff;

const MAX_ATTEMPTS: u32 = 3;

/// One slice of a media download plus how much of the file is now received.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    pub data: Bytes,
    /// Completion in `[0.0, 1.0]` after this chunk.
    pub fraction: f64,
}

/// Pulls a file in `Range` requests of `chunk_size` bytes.
pub struct DriveMediaStream {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    url: Url,
    chunk_size: u64,
    offset: u64,
    total: Option<u64>,
    done: bool,
}

impl DriveMediaStream {
    pub(crate) fn new(client: Client, tokens: Arc<dyn TokenProvider>, url: Url, chunk_size: u64) -> Self {
        Self {
            client,
            tokens,
            url,
            chunk_size,
            offset: 0,
            total: None,
            done: false,
        }
    }

    pub fn total_size(&self) -> Option<u64> {
        self.total
    }

    pub fn bytes_received(&self) -> u64 {
        self.offset
    }

    /// Next chunk, or `None` once the whole file has been received.
    pub async fn next_chunk(&mut self) -> Result<Option<MediaChunk>, RemoteError> {
        if self.done {
            return Ok(None);
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.fetch_range().await {
                Ok(chunk) => return Ok(chunk),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        url = %self.url,
                        offset = self.offset,
                        attempt,
                        error = %e,
                        "chunk request failed, retrying"
                    );
                    tokio::time::sleep(backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_range(&mut self) -> Result<Option<MediaChunk>, RemoteError> {
        let start = self.offset;
        let end = start + self.chunk_size - 1;
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .get(self.url.clone())
            .bearer_auth(token)
            .header(RANGE, format!("bytes={start}-{end}"))
            .send()
            .await?;

        match resp.status() {
            StatusCode::PARTIAL_CONTENT => {
                let total = resp
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|h| h.to_str().ok())
                    .and_then(parse_content_range_total);
                if total.is_some() {
                    self.total = total;
                }
                let data = resp.bytes().await?;
                if data.is_empty() {
                    if let Some(t) = self.total.filter(|&t| start < t) {
                        return Err(RemoteError::Transport(format!(
                            "empty range response at {start} of {t} bytes"
                        )));
                    }
                }
                self.offset += data.len() as u64;

                let finished = match self.total {
                    Some(t) => self.offset >= t,
                    // Unknown length: a short read is the last one.
                    None => (data.len() as u64) < self.chunk_size,
                };
                if finished || data.is_empty() {
                    self.done = true;
                }
                Ok(Some(MediaChunk {
                    fraction: self.fraction(),
                    data,
                }))
            }
            StatusCode::OK => {
                // Range ignored: the body is the whole file.
                if start > 0 {
                    return Err(RemoteError::Decode(format!(
                        "server returned full content for range starting at {start}"
                    )));
                }
                let data = resp.bytes().await?;
                self.offset = data.len() as u64;
                self.total = Some(self.offset);
                self.done = true;
                Ok(Some(MediaChunk {
                    data,
                    fraction: 1.0,
                }))
            }
            StatusCode::RANGE_NOT_SATISFIABLE => {
                // Nothing at or beyond `start`; for start == 0 the file is empty.
                self.total = Some(start);
                self.done = true;
                Ok(None)
            }
            _ => Err(super::status_error(resp).await),
        }
    }

    fn fraction(&self) -> f64 {
        match self.total {
            Some(0) => 1.0,
            Some(t) => (self.offset as f64 / t as f64).min(1.0),
            None if self.done => 1.0,
            None => 0.0,
        }
    }
}

/// `bytes 0-99/1234` → `Some(1234)`; `*` totals are unknown.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
