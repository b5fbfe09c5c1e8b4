#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use camino::Utf8PathBuf;
use drivesync_config::Config;
use drivesync_core::{FolderId, RemoteEntry};
use drivesync_infra::{MediaChunk, RemoteError};
use drivesync_pipeline::{MediaStream, RemoteStore};
use tracing_subscriber::fmt::MakeWriter;

pub struct FakeFolder {
    pub valid: bool,
    pub list_error: bool,
    pub entries: Vec<RemoteEntry>,
}

pub struct FakeFile {
    pub data: Vec<u8>,
    pub chunk: usize,
    /// Fail the next transfer after this many chunks; cleared once used.
    pub fail_after: Option<usize>,
    /// End the next transfer cleanly after this many bytes; cleared once used.
    pub truncate_at: Option<usize>,
}

#[derive(Default)]
pub struct FakeStore {
    pub folders: Mutex<HashMap<String, FakeFolder>>,
    pub files: Mutex<HashMap<String, FakeFile>>,
    pub opened: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replaces folder `id` with the given text files, served in 4-byte chunks.
    pub fn folder(&self, id: &str, files: &[(&str, &str)]) {
        self.folders.lock().unwrap().insert(
            id.to_string(),
            FakeFolder {
                valid: true,
                list_error: false,
                entries: Vec::new(),
            },
        );
        for (name, data) in files {
            self.add_file(id, name, data.as_bytes().to_vec());
        }
    }

    /// Appends a file to an existing folder. Its remote id is `"{folder}/{name}"`.
    pub fn add_file(&self, folder: &str, name: &str, data: Vec<u8>) {
        let file_id = format!("{folder}/{name}");
        if let Some(f) = self.folders.lock().unwrap().get_mut(folder) {
            f.entries.push(RemoteEntry {
                id: file_id.clone(),
                name: name.to_string(),
                mime_type: "application/octet-stream".into(),
                size: Some(data.len() as u64),
            });
        }
        self.files.lock().unwrap().insert(
            file_id,
            FakeFile {
                data,
                chunk: 4,
                fail_after: None,
                truncate_at: None,
            },
        );
    }

    pub fn invalid_folder(&self, id: &str) {
        self.folders.lock().unwrap().insert(
            id.to_string(),
            FakeFolder {
                valid: false,
                list_error: false,
                entries: Vec::new(),
            },
        );
    }

    pub fn broken_listing(&self, id: &str) {
        self.folders.lock().unwrap().insert(
            id.to_string(),
            FakeFolder {
                valid: true,
                list_error: true,
                entries: Vec::new(),
            },
        );
    }

    pub fn fail_next_transfer(&self, file_id: &str, after_chunks: usize) {
        if let Some(f) = self.files.lock().unwrap().get_mut(file_id) {
            f.fail_after = Some(after_chunks);
        }
    }

    pub fn truncate_next_transfer(&self, file_id: &str, bytes: usize) {
        if let Some(f) = self.files.lock().unwrap().get_mut(file_id) {
            f.truncate_at = Some(bytes);
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn clear_opened(&self) {
        self.opened.lock().unwrap().clear();
    }
}

pub struct FakeStream {
    data: Bytes,
    chunk: usize,
    pos: usize,
    served: usize,
    fail_after: Option<usize>,
}

#[async_trait::async_trait]
impl MediaStream for FakeStream {
    async fn next_chunk(&mut self) -> Result<Option<MediaChunk>, RemoteError> {
        if self.fail_after == Some(self.served) {
            return Err(RemoteError::Connection("connection reset".into()));
        }
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let end = (self.pos + self.chunk).min(self.data.len());
        let data = self.data.slice(self.pos..end);
        self.pos = end;
        self.served += 1;
        Ok(Some(MediaChunk {
            data,
            fraction: self.pos as f64 / self.data.len() as f64,
        }))
    }
}

#[async_trait::async_trait]
impl RemoteStore for FakeStore {
    async fn validate_folder(&self, folder: &FolderId) -> Result<bool, RemoteError> {
        Ok(self
            .folders
            .lock()
            .unwrap()
            .get(folder.as_str())
            .is_some_and(|f| f.valid))
    }

    async fn list_children(&self, folder: &FolderId) -> Result<Vec<RemoteEntry>, RemoteError> {
        let folders = self.folders.lock().unwrap();
        match folders.get(folder.as_str()) {
            Some(f) if f.list_error => Err(RemoteError::Status {
                status: 500,
                body: "backend error".into(),
            }),
            Some(f) => Ok(f.entries.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn open_media(&self, remote_id: &str) -> Result<Box<dyn MediaStream>, RemoteError> {
        self.opened.lock().unwrap().push(remote_id.to_string());
        let mut files = self.files.lock().unwrap();
        let file = files.get_mut(remote_id).ok_or_else(|| RemoteError::Status {
            status: 404,
            body: remote_id.to_string(),
        })?;
        let mut data = Bytes::from(file.data.clone());
        if let Some(n) = file.truncate_at.take() {
            data.truncate(n);
        }
        Ok(Box::new(FakeStream {
            data,
            chunk: file.chunk,
            pos: 0,
            served: 0,
            fail_after: file.fail_after.take(),
        }))
    }
}

pub fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().join("downloads")).unwrap();
    (dir, root)
}

pub fn config(folders: &[&str], exts: &[&str], download_dir: &Utf8PathBuf) -> Config {
    let json = serde_json_config(folders, exts, download_dir);
    Config::from_json(&json).unwrap()
}

fn serde_json_config(folders: &[&str], exts: &[&str], download_dir: &Utf8PathBuf) -> String {
    let quote = |v: &[&str]| {
        v.iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        r#"{{"folder_ids":[{}],"allowed_extensions":[{}],"loop_interval":1,"download_dir":"{}"}}"#,
        quote(folders),
        quote(exts),
        download_dir.as_str().replace('\\', "\\\\")
    )
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn lines_containing(&self, needle: &str) -> usize {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|l| l.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(self.0.clone())
    }
}

/// Routes INFO and above into a buffer for the current thread until the guard drops.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
