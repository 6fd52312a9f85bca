//! Text extraction: turns an uploaded document into plain text for analysis.
//!
//! Dispatch is by file extension only; the content is never sniffed. Parsing is
//! delegated to `pdf-extract` (PDF) and `zip` + `quick-xml` (DOCX).

mod docx;
mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Error reading {format}: {reason}")]
    Extraction { format: &'static str, reason: String },
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    /// `.docx` and `.doc` both go through the OOXML reader.
    Docx,
}

impl DocumentFormat {
    /// Detects the format from the filename's last extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::PlainText),
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractError::UnsupportedFormat(extension)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "TXT",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        }
    }
}

/// Extracts plain text from uploaded bytes, using `filename` to pick the parser.
pub fn extract_text(content: &[u8], filename: &str) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_filename(filename)?;
    match format {
        DocumentFormat::PlainText => decode_plain_text(content),
        DocumentFormat::Pdf => pdf::extract(content),
        DocumentFormat::Docx => docx::extract(content),
    }
}

fn decode_plain_text(content: &[u8]) -> Result<String, ExtractError> {
    let text = std::str::from_utf8(content).map_err(|e| ExtractError::Extraction {
        format: DocumentFormat::PlainText.label(),
        reason: format!("file is not valid UTF-8 ({e})"),
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}
