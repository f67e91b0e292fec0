use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the paragraph text of a DOCX file held in memory.
///
/// Each paragraph is emitted followed by a newline. Paragraphs nested inside
/// another paragraph (text boxes) are folded into the enclosing one.
pub fn read_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractionError::Docx(format!("not a zip container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    paragraphs_to_text(&xml)
}

fn paragraphs_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExtractionError::Docx(format!(
                "malformed XML at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    if paragraph_depth == 0 {
                        current.clear();
                    }
                    paragraph_depth += 1;
                }
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        text.push_str(&current);
                        text.push('\n');
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                // <w:p/> is an empty paragraph
                b"w:p" if paragraph_depth == 0 => text.push('\n'),
                // Tab stops in w:pPr are also named w:tab; only runs count.
                b"w:tab" if run_depth > 0 => current.push('\t'),
                b"w:br" | b"w:cr" if run_depth > 0 => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text && paragraph_depth > 0 => {
                let value = e
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(format!("bad text escape: {e}")))?;
                current.push_str(&value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Builds a minimal DOCX container with one paragraph per entry.
#[cfg(test)]
pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(DOCUMENT_PART, zip::write::FileOptions::default())
        .expect("start document part");
    writer.write_all(xml.as_bytes()).expect("write document part");
    writer.finish().expect("finish zip").into_inner()
}
