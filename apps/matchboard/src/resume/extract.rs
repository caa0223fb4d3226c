use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type '{0}' (expected .pdf, .txt or .md)")]
    Unsupported(String),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("file is not valid UTF-8 text")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Lowercased extension, or an empty string when there is none.
fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Display name for a candidate: the upload's file name without its extension.
pub fn candidate_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name)
        .to_string()
}

/// Extracts plain text from an uploaded resume. PDFs go through `pdf-extract`;
/// `.txt` and `.md` uploads are read as UTF-8.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match extension(file_name).as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(format!("{e:?}"))),
        "txt" | "md" | "text" => Ok(String::from_utf8(bytes.to_vec())?),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

/// Runs `extract_text` on the blocking pool. PDF parsing is CPU-bound and
/// `pdf-extract` can panic on malformed input; a panic surfaces as `Pdf`.
pub async fn extract_text_blocking(file_name: String, bytes: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&file_name, &bytes))
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
}
