/*!
 * Per-format extraction and rebuild strategies.
 *
 * Marker splicing is the same for every format; what differs is how parts
 * are pulled out of the source bytes and how the reconstructed parts are
 * packed back into an output document.
 */

use log::{debug, info, warn};
use std::fmt::Debug;
use std::sync::Arc;

use crate::container::{Container, ContainerRebuilder, MAIN_DOCUMENT_PART, text_bearing_parts};
use crate::document::{DocumentFormat, OutputDocument, SourceDocument};
use crate::errors::{PipelineError, Result};
use crate::extraction::{ContentStreamExtractor, Extraction, Extractor, PartKind, PdfTextExtractor, SourcePart};
use crate::translation::RebuiltPart;

/// Part name used for single-part text documents
pub const PLAIN_TEXT_PART: &str = "document.txt";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// The rebuilt document plus non-fatal conditions met while packing it
#[derive(Debug)]
pub struct RebuiltDocument {
    pub output: OutputDocument,
    /// `PartNotFound` for every optional part that could not be replaced
    pub skipped: Vec<PipelineError>,
}

/// Extraction and rebuild for one document format
pub trait DocumentStrategy: Send + Sync + Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Pull the text-bearing parts out of `source` and extract them
    fn extract(&self, source: &SourceDocument, extractor: &Extractor) -> Result<Extraction>;

    /// Pack reconstructed parts into the output document
    fn rebuild(&self, source: &SourceDocument, parts: Vec<RebuiltPart>) -> Result<RebuiltDocument>;
}

/// Marker splicing inside a zip-packaged WordprocessingML document
#[derive(Debug, Clone, Default)]
pub struct WordprocessingStrategy;

impl DocumentStrategy for WordprocessingStrategy {
    fn name(&self) -> &'static str {
        "wordprocessing"
    }

    fn extract(&self, source: &SourceDocument, extractor: &Extractor) -> Result<Extraction> {
        let container = Container::read(&source.bytes)?;
        let names = text_bearing_parts(&container)?;
        debug!("Text-bearing parts: {:?}", names);

        let mut parts = Vec::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            match container.xml(name) {
                Ok(content) => parts.push(SourcePart {
                    name,
                    kind: PartKind::Xml,
                    content,
                }),
                // The main body always comes first
                Err(PipelineError::PartNotFound(missing)) if position > 0 => {
                    warn!("Skipping optional part {}", missing);
                }
                Err(e) => return Err(e),
            }
        }

        extractor.extract(&parts)
    }

    fn rebuild(&self, source: &SourceDocument, parts: Vec<RebuiltPart>) -> Result<RebuiltDocument> {
        let mut rebuilder = match parts.first() {
            Some(main) => ContainerRebuilder::new().require(main.name.clone()),
            None => ContainerRebuilder::new().require(MAIN_DOCUMENT_PART),
        };

        for part in parts {
            if part.marker_count > 0 {
                rebuilder.replace(part.name, part.content);
            }
        }

        let outcome = rebuilder.rebuild(&source.bytes)?;
        info!(
            "Rebuilt container: {} parts replaced, {} skipped",
            outcome.replaced.len(),
            outcome.skipped.len()
        );

        Ok(RebuiltDocument {
            output: OutputDocument::new(outcome.bytes, DocumentFormat::WordProcessing),
            skipped: outcome.skipped,
        })
    }
}

/// UTF-8 plain text as a single part
#[derive(Debug, Clone, Default)]
pub struct PlainTextStrategy;

impl PlainTextStrategy {
    fn extract_text(&self, text: &str, extractor: &Extractor) -> Result<Extraction> {
        let parts = [SourcePart {
            name: PLAIN_TEXT_PART,
            kind: PartKind::PlainText,
            content: text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text),
        }];
        extractor.extract(&parts)
    }

    fn pack(&self, parts: Vec<RebuiltPart>, keep_bom: bool) -> Result<RebuiltDocument> {
        let part = parts
            .into_iter()
            .find(|part| part.name == PLAIN_TEXT_PART)
            .ok_or_else(|| PipelineError::InvalidContainer(format!("missing {}", PLAIN_TEXT_PART)))?;

        let mut text = String::with_capacity(part.content.len() + 3);
        if keep_bom {
            text.push(BYTE_ORDER_MARK);
        }
        text.push_str(&part.content);

        Ok(RebuiltDocument {
            output: OutputDocument::new(text.into_bytes(), DocumentFormat::PlainText),
            skipped: Vec::new(),
        })
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| PipelineError::InvalidContainer(format!("text is not valid UTF-8: {}", e)))
}

impl DocumentStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn extract(&self, source: &SourceDocument, extractor: &Extractor) -> Result<Extraction> {
        self.extract_text(decode_utf8(&source.bytes)?, extractor)
    }

    fn rebuild(&self, source: &SourceDocument, parts: Vec<RebuiltPart>) -> Result<RebuiltDocument> {
        let keep_bom = decode_utf8(&source.bytes)?.starts_with(BYTE_ORDER_MARK);
        self.pack(parts, keep_bom)
    }
}

/// PDF reduced to text, then handled as plain text
#[derive(Debug, Clone)]
pub struct PdfTextStrategy {
    extractor: Arc<dyn PdfTextExtractor>,
}

impl Default for PdfTextStrategy {
    fn default() -> Self {
        Self::new(Arc::new(ContentStreamExtractor))
    }
}

impl PdfTextStrategy {
    pub fn new(extractor: Arc<dyn PdfTextExtractor>) -> Self {
        Self { extractor }
    }
}

impl DocumentStrategy for PdfTextStrategy {
    fn name(&self) -> &'static str {
        "pdf-text"
    }

    fn extract(&self, source: &SourceDocument, extractor: &Extractor) -> Result<Extraction> {
        let text = self.extractor.extract_text(&source.bytes)?;
        PlainTextStrategy.extract_text(&text, extractor)
    }

    fn rebuild(&self, _source: &SourceDocument, parts: Vec<RebuiltPart>) -> Result<RebuiltDocument> {
        PlainTextStrategy.pack(parts, false)
    }
}
