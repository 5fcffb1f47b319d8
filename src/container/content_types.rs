//! Discovery of text-bearing parts in a WordprocessingML package.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::codec::Container;
use crate::errors::{PipelineError, Result};

/// Conventional location of the main document body
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const MAIN_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
];

const AUXILIARY_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml",
];

/// Text-bearing parts in processing order: main body first, then headers,
/// footers, footnotes and endnotes in archive order.
///
/// Fails with `InvalidContainer` when no main body can be located.
pub fn text_bearing_parts(container: &Container) -> Result<Vec<String>> {
    let overrides = match container.xml(CONTENT_TYPES_PART) {
        Ok(xml) => parse_overrides(xml)?,
        Err(_) => Vec::new(),
    };

    let main = overrides
        .iter()
        .find(|(_, content_type)| MAIN_CONTENT_TYPES.contains(&content_type.as_str()))
        .map(|(name, _)| name.clone())
        .filter(|name| container.get(name).is_some())
        .or_else(|| {
            container
                .get(MAIN_DOCUMENT_PART)
                .map(|_| MAIN_DOCUMENT_PART.to_string())
        })
        .ok_or_else(|| {
            PipelineError::InvalidContainer(format!("missing main document part {}", MAIN_DOCUMENT_PART))
        })?;

    let mut parts = vec![main.clone()];
    for name in container.names() {
        if name == main {
            continue;
        }
        let declared = overrides
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, content_type)| AUXILIARY_CONTENT_TYPES.contains(&content_type.as_str()));
        let is_auxiliary = declared.unwrap_or_else(|| is_auxiliary_name(name));
        if is_auxiliary {
            parts.push(name.to_string());
        }
    }

    Ok(parts)
}

/// `(part name without leading slash, content type)` pairs from the
/// `<Override>` elements of `[Content_Types].xml`
fn parse_overrides(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut overrides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"Override" => {
                let mut part_name = None;
                let mut content_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"PartName" => part_name = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"ContentType" => content_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(part_name), Some(content_type)) = (part_name, content_type) {
                    overrides.push((part_name.trim_start_matches('/').to_string(), content_type));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PipelineError::InvalidContainer(format!(
                    "malformed {}: {}",
                    CONTENT_TYPES_PART, e
                )));
            }
            _ => {}
        }
    }

    Ok(overrides)
}

fn is_auxiliary_name(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    if file.contains('/') || !file.ends_with(".xml") {
        return false;
    }
    file.starts_with("header") || file.starts_with("footer") || file == "footnotes.xml" || file == "endnotes.xml"
}
