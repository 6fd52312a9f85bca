use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";
const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Reads the main document part of an OOXML package and returns its non-empty
/// paragraphs joined by newlines.
pub(super) fn extract(content: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))
        .map_err(|e| failure(format!("not a valid document package ({e})")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| failure(format!("missing {DOCUMENT_PART} ({e})")))?
        .read_to_string(&mut xml)
        .map_err(|e| failure(format!("unreadable {DOCUMENT_PART} ({e})")))?;

    let paragraphs = collect_paragraphs(&xml)?;
    Ok(paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Walks WordprocessingML and returns the text of each paragraph, in document order.
/// Elements are matched by namespace, whatever prefix the package binds it to.
fn collect_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text_run = false;

    loop {
        let position = reader.buffer_position();
        let (in_wordml, event) = match reader.read_resolved_event() {
            Ok((ns, event)) => (is_wordml(&ns), event),
            Err(e) => {
                return Err(failure(format!("malformed XML at position {position} ({e})")))
            }
        };

        match event {
            Event::Start(e) if in_wordml => match e.local_name().as_ref() {
                b"p" => {
                    if depth == 0 {
                        current.clear();
                    }
                    depth += 1;
                }
                b"t" => in_text_run = true,
                b"tab" if depth > 0 => current.push('\t'),
                b"br" | b"cr" if depth > 0 => current.push('\n'),
                _ => {}
            },
            Event::Empty(e) if in_wordml => match e.local_name().as_ref() {
                b"tab" if depth > 0 => current.push('\t'),
                b"br" | b"cr" if depth > 0 => current.push('\n'),
                _ => {}
            },
            Event::End(e) if in_wordml => match e.local_name().as_ref() {
                b"p" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                b"t" => in_text_run = false,
                _ => {}
            },
            Event::Text(t) if in_text_run && depth > 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| failure(format!("malformed text run ({e})")))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn is_wordml(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == WORDML_NS)
}

fn failure(reason: String) -> ExtractError {
    ExtractError::Extraction {
        format: "DOCX",
        reason,
    }
}
