//! Transient on-disk artifacts: uploaded documents and extracted text.
//!
//! Every artifact name embeds a millisecond timestamp plus a random UUID, so
//! concurrent requests never collide. Files are written to a temp file in the
//! target directory and renamed into place, so a reader never sees a partial
//! artifact. A `ScopedFile` deletes its file on drop unless retention is on.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

/// A file owned by one request. Removed on drop unless `retain` is set.
#[derive(Debug)]
pub struct ScopedFile {
    path: PathBuf,
    retain: bool,
}

impl ScopedFile {
    pub fn new(path: PathBuf, retain: bool) -> Self {
        Self { path, retain }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed transient artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove transient artifact: {e}"),
        }
    }
}

/// `<unix-millis>-<uuid>`: sortable by creation time, unique across requests.
pub fn unique_stem() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Writes `contents` to `dir/name` through a temp file and rename.
/// Creates `dir` if missing. Fails instead of overwriting an existing file.
pub fn write_atomic(dir: &Path, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    let target = dir.join(name);
    tmp.persist_noclobber(&target).map_err(|e| e.error)?;
    Ok(target)
}

/// Reduces a client-supplied filename to a safe final path component.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Directory holding uploaded documents for the lifetime of their request.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    retain: bool,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, retain: bool) -> Self {
        Self {
            dir: dir.into(),
            retain,
        }
    }

    /// Persists an uploaded document as `<unique-stem>-<original name>`.
    pub async fn save(&self, original_name: &str, bytes: Bytes) -> io::Result<ScopedFile> {
        let dir = self.dir.clone();
        let name = format!("{}-{}", unique_stem(), sanitize_file_name(original_name));

        let retain = self.retain;

        tokio::task::spawn_blocking(move || {
            write_atomic(&dir, &name, &bytes).map(|path| ScopedFile::new(path, retain))
        })
        .await
        .map_err(io::Error::other)?
    }
}
