//! Text Extractor — turns an uploaded document into a persisted plain-text artifact.
//!
//! Decoding is delegated to a `DocumentDecoder` so the PDF backend can be swapped
//! (and faked in tests). Decoding and the artifact write are blocking work and
//! run inside `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::storage::{unique_stem, write_atomic, ScopedFile};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document could not be decoded: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Opaque bytes-to-text capability.
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Decodes PDF documents with `pdf-extract`.
pub struct PdfDecoder;

impl DocumentDecoder for PdfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Decode(e.to_string()))
    }
}

/// A persisted extraction result. Written once, never modified.
#[derive(Debug)]
pub struct ExtractedText {
    id: String,
    file: ScopedFile,
}

impl ExtractedText {
    /// Unique artifact identifier, e.g. `resume-1718000000000-3f2a…`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[derive(Clone)]
pub struct TextExtractor {
    decoder: Arc<dyn DocumentDecoder>,
    output_dir: PathBuf,
    retain: bool,
}

impl TextExtractor {
    pub fn new(decoder: Arc<dyn DocumentDecoder>, output_dir: impl Into<PathBuf>, retain: bool) -> Self {
        Self {
            decoder,
            output_dir: output_dir.into(),
            retain,
        }
    }

    /// Decodes `bytes` and stores the text under a fresh, uniquely named artifact.
    pub async fn extract(&self, bytes: Bytes) -> Result<ExtractedText, ExtractError> {
        let decoder = Arc::clone(&self.decoder);
        let dir = self.output_dir.clone();
        let id = format!("resume-{}", unique_stem());
        let file_name = format!("{id}.txt");

        let retain = self.retain;

        // The artifact is owned by a `ScopedFile` as soon as it exists, so it is
        // still removed if the caller stops waiting for this task.
        let file = tokio::task::spawn_blocking(move || -> Result<ScopedFile, ExtractError> {
            let text = decoder.decode(&bytes)?;
            let path = write_atomic(&dir, &file_name, text.as_bytes())?;
            Ok(ScopedFile::new(path, retain))
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))??;

        info!(artifact = %file.path().display(), "Text extracted");

        Ok(ExtractedText { id, file })
    }
}
