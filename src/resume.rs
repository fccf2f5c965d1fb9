// src/resume.rs
//! Resume intake: PDF text extraction

use crate::errors::ResumeError;
use crate::utils::normalize_lines;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extract plain text from an uploaded PDF.
///
/// Parsing runs on the blocking pool; a panic inside the PDF parser is
/// reported as an extraction failure.
pub async fn extract_resume_text(bytes: Vec<u8>) -> Result<String, ResumeError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ResumeError::NotPdf);
    }

    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ResumeError::Extraction(e.to_string()))?
        .map_err(|e| ResumeError::Extraction(e.to_string()))?;

    let text = normalize_lines(&raw);
    if text.is_empty() {
        return Err(ResumeError::Empty);
    }
    Ok(text)
}

/// Size check against the Telegram-reported file size, before download.
pub fn check_size(size: Option<u64>, limit: u64) -> Result<(), ResumeError> {
    match size {
        Some(size) if size > limit => Err(ResumeError::TooLarge { size, limit }),
        _ => Ok(()),
    }
}
