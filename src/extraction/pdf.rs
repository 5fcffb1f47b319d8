/*!
 * Text recovery from PDF files.
 *
 * PDF pages are not rebuilt; a PDF is reduced to plain text which then goes
 * through the plain-text strategy. `PdfTextExtractor` is the seam for a
 * better converter; `ContentStreamExtractor` is the built-in one.
 *
 * The built-in extractor loads the document with `lopdf`, decodes each
 * page's content stream and interprets the text-showing operators. Every
 * `BT`/`ET` text object becomes one paragraph. Strings are decoded with the
 * font's encoding (standard encodings and ToUnicode CMaps); fonts `lopdf`
 * cannot resolve fall back to UTF-16BE or Latin-1.
 */

use log::{debug, warn};
use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::{PipelineError, Result};

/// Converts PDF bytes to plain text
pub trait PdfTextExtractor: Send + Sync + Debug {
    /// Extract the document text, paragraphs separated by blank lines
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Built-in extractor working on page content streams
#[derive(Debug, Clone, Default)]
pub struct ContentStreamExtractor;

impl PdfTextExtractor for ContentStreamExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let header_window = &bytes[..bytes.len().min(1024)];
        if !header_window.windows(5).any(|window| window == b"%PDF-") {
            return Err(PipelineError::InvalidContainer("missing %PDF- header".to_string()));
        }

        let document = Document::load_mem(bytes)
            .map_err(|e| PipelineError::InvalidContainer(format!("unreadable PDF: {}", e)))?;

        let pages = document.get_pages();
        let mut paragraphs = Vec::new();
        for (number, page_id) in &pages {
            match page_paragraphs(&document, *page_id) {
                Ok(found) => paragraphs.extend(found),
                Err(e) => warn!("Skipping PDF page {}: {}", number, e),
            }
        }

        let text = paragraphs.join("\n\n");
        if text.is_empty() {
            warn!("No extractable text found on {} PDF pages", pages.len());
        } else {
            debug!("Extracted {} chars of text from {} PDF pages", text.len(), pages.len());
        }
        Ok(text)
    }
}

/// Text objects of one page, in content order
fn page_paragraphs(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, Encoding<'_>> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("Font {} has no usable encoding: {}", String::from_utf8_lossy(&name), e);
                None
            }
        })
        .collect();

    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut encoding: Option<&Encoding<'_>> = None;

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => current.clear(),
            "ET" => {
                push_paragraph(&mut paragraphs, &current);
                current.clear();
            }
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Tj" | "TJ" => show(&mut current, encoding, operands),
            "'" | "\"" => {
                current.push('\n');
                show(&mut current, encoding, operands);
            }
            "T*" | "Tm" => current.push('\n'),
            "Td" | "TD" => {
                let ty = operands.get(1).and_then(|value| value.as_float().ok()).unwrap_or(0.0);
                current.push(if ty.abs() > f32::EPSILON { '\n' } else { ' ' });
            }
            _ => {}
        }
    }
    push_paragraph(&mut paragraphs, &current);

    Ok(paragraphs)
}

/// Append the strings among `operands`; array kerning wider than a glyph is a word gap
fn show(out: &mut String, encoding: Option<&Encoding<'_>>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&decode(encoding, bytes)),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => out.push_str(&decode(encoding, bytes)),
                        Object::Integer(n) if *n < -250 => out.push(' '),
                        Object::Real(n) if *n < -250.0 => out.push(' '),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn decode(encoding: Option<&Encoding<'_>>, bytes: &[u8]) -> String {
    encoding
        .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
        .unwrap_or_else(|| decode_unmapped(bytes))
}

fn decode_unmapped(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xfe, 0xff]) {
        let units: Vec<u16> = body
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Collapse spacing and drop empty lines; blank text objects are skipped
fn push_paragraph(paragraphs: &mut Vec<String>, raw: &str) {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    if !lines.is_empty() {
        paragraphs.push(lines.join("\n"));
    }
}
