use std::panic::{self, AssertUnwindSafe};

use pdf_extract::{Document, OutputError, PlainTextOutput};

use super::ExtractError;

/// Pages beyond this limit are never parsed; a truncation notice is appended instead.
pub const MAX_PDF_PAGES: usize = 50;

pub(super) fn extract(content: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    panic::catch_unwind(AssertUnwindSafe(|| extract_leading_pages(content)))
        .map_err(|_| failure("parser aborted on malformed document".to_string()))?
        .map_err(|e| failure(e.to_string()))
}

/// Loads the document once and renders only the first `MAX_PDF_PAGES` pages.
/// A page that fails to render fails the whole extraction.
fn extract_leading_pages(content: &[u8]) -> Result<String, OutputError> {
    let mut doc = Document::load_mem(content)?;
    if doc.is_encrypted() {
        doc.decrypt("")?;
    }

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len().min(MAX_PDF_PAGES));
    for &page_num in pages.keys().take(MAX_PDF_PAGES) {
        let mut text = String::new();
        pdf_extract::output_doc_page(&doc, &mut PlainTextOutput::new(&mut text), page_num)?;
        texts.push(text);
    }

    Ok(join_pages(&texts, pages.len()))
}

fn join_pages(pages: &[String], total_pages: usize) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    if total_pages > MAX_PDF_PAGES {
        text.push_str(&format!(
            "\n[Note: Document truncated to first {MAX_PDF_PAGES} pages]"
        ));
    }
    text
}

fn failure(reason: String) -> ExtractError {
    ExtractError::Extraction {
        format: "PDF",
        reason,
    }
}
