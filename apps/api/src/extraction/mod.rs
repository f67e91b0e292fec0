//! Text extraction from uploaded files.
//!
//! The file type is decided by the filename suffix only. Parsing is CPU-bound,
//! so it runs on the blocking pool.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}. Only PDF and DOCX are supported.")]
    UnsupportedFileType(String),

    #[error("failed to read PDF: {0}")]
    Pdf(String),

    #[error("failed to read DOCX: {0}")]
    Docx(String),

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Case-sensitive suffix match, so `REPORT.PDF` is rejected.
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if filename.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

/// Extracts the plain text of an uploaded PDF or DOCX file.
pub async fn extract_text(filename: &str, data: Bytes) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_filename(filename)
        .ok_or_else(|| ExtractionError::UnsupportedFileType(filename.to_string()))?;

    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf::read_pdf(&data),
        DocumentKind::Docx => docx::read_docx(&data),
    })
    .await
    .map_err(|e| ExtractionError::Worker(e.to_string()))??;
    let text = strip_nul(text);

    info!(
        "Extracted {} chars from {filename} ({kind:?})",
        text.chars().count()
    );
    Ok(text)
}

/// PostgreSQL `TEXT` cannot hold NUL, which some PDF font mappings emit.
fn strip_nul(text: String) -> String {
    if !text.contains('\0') {
        return text;
    }
    warn!("Removing NUL characters from extracted text");
    text.replace('\0', "")
}
