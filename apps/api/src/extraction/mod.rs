//! Document loader — turns an uploaded resume (PDF, DOCX or plain text) into text.
//!
//! Uploads are staged to a named temp file that lives only as long as the
//! extraction call. Failures are typed (`ExtractionError`); the `[ERROR ...]`
//! string convention survives only on the wire via `marker_text()`.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

mod docx;
mod pdf;

/// Prefix clients match on to recognise a failed extraction.
pub const ERROR_MARKER: &str = "[ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Txt,
}

impl DocumentType {
    /// Detects the document type from the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "txt" => Some(DocumentType::Txt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Txt => "txt",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            DocumentType::Pdf => ".pdf",
            DocumentType::Docx => ".docx",
            DocumentType::Txt => ".txt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub file_type: DocumentType,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract PDF text: {0}")]
    Pdf(String),

    #[error("Could not extract DOCX text: {0}")]
    Docx(String),

    #[error("Could not read text file: {0}")]
    Text(String),

    #[error("Could not stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl ExtractionError {
    /// The type detected from the filename before extraction failed, if any.
    pub fn file_type(&self) -> Option<DocumentType> {
        match self {
            ExtractionError::Pdf(_) => Some(DocumentType::Pdf),
            ExtractionError::Docx(_) => Some(DocumentType::Docx),
            ExtractionError::Text(_) => Some(DocumentType::Txt),
            ExtractionError::UnsupportedFormat(_)
            | ExtractionError::Io(_)
            | ExtractionError::Task(_) => None,
        }
    }

    /// Renders the error in the `[ERROR: ...]` form existing clients expect.
    pub fn marker_text(&self) -> String {
        match self {
            ExtractionError::UnsupportedFormat(_) => {
                format!("{ERROR_MARKER}: Unsupported file format]")
            }
            ExtractionError::Pdf(detail) => {
                format!("{ERROR_MARKER}: Could not extract PDF text] {detail}")
            }
            ExtractionError::Docx(detail) => {
                format!("{ERROR_MARKER}: Could not extract DOCX text] {detail}")
            }
            ExtractionError::Text(detail) => {
                format!("{ERROR_MARKER}: Could not read text file] {detail}")
            }
            ExtractionError::Io(e) => format!("{ERROR_MARKER}: Could not stage upload] {e}"),
            ExtractionError::Task(detail) => {
                format!("{ERROR_MARKER}: Extraction task failed] {detail}")
            }
        }
    }
}

/// Extracts text from an uploaded file on the blocking pool.
pub async fn extract_upload(
    bytes: Bytes,
    filename: String,
) -> Result<ExtractedDocument, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_document(&bytes, &filename))
        .await
        .unwrap_or_else(|e| Err(ExtractionError::Task(e.to_string())))
}

/// Dispatches on the filename extension and extracts the document's text.
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let file_type = DocumentType::from_filename(filename)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(filename.to_string()))?;

    // Deleted when `staged` drops, on every return path below.
    let staged = stage_upload(bytes, file_type)?;

    let text = match file_type {
        DocumentType::Pdf => pdf::extract_text(staged.path())?,
        DocumentType::Docx => docx::extract_text(staged.path())?,
        DocumentType::Txt => read_utf8(staged.path())?,
    };

    debug!(
        "Extracted {} chars from {} ({})",
        text.chars().count(),
        filename,
        file_type.as_str()
    );

    Ok(ExtractedDocument { text, file_type })
}

fn stage_upload(bytes: &[u8], file_type: DocumentType) -> Result<NamedTempFile, ExtractionError> {
    let mut staged = tempfile::Builder::new()
        .prefix("resume-upload-")
        .suffix(file_type.suffix())
        .tempfile()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    Ok(staged)
}

fn read_utf8(path: &Path) -> Result<String, ExtractionError> {
    let raw = std::fs::read(path)?;
    String::from_utf8(raw).map_err(|e| ExtractionError::Text(e.to_string()))
}
