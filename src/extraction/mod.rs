/*!
 * Structural extraction: text segments out, skeleton in.
 *
 * - `delimiter`: per-document delimiter choice and marker syntax
 * - `scanner`: text-node discovery in XML and plain-text parts
 * - `attributes`: run/paragraph formatting for rich extraction
 * - `pdf`: text recovery from PDF content streams
 *
 * Extraction is deterministic: the same parts always yield the same
 * delimiter, flattened text, skeleton and segment list.
 */

pub mod attributes;
pub mod delimiter;
pub mod pdf;
pub mod scanner;

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use self::attributes::{ParagraphAttributes, RunAttributes};
pub use self::delimiter::{DEFAULT_DELIMITERS, choose_delimiter, find_markers, marker, parse_marker};
pub use self::pdf::{ContentStreamExtractor, PdfTextExtractor};

use self::scanner::{TextNode, scan_plain_text, scan_xml};
use crate::errors::Result;

/// How a part's text nodes are found and how replacement text is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartKind {
    /// WordprocessingML / DrawingML XML
    Xml,
    /// Plain UTF-8 text
    PlainText,
}

/// A part handed to the extractor
#[derive(Debug, Clone, Copy)]
pub struct SourcePart<'a> {
    pub name: &'a str,
    pub kind: PartKind,
    pub content: &'a str,
}

/// Where a segment came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentLocation {
    /// Part name, e.g. `word/document.xml`
    pub part: String,
    /// Position of the part in extraction order
    pub part_index: usize,
    /// Ordinal of the text node within the part, counting skipped nodes
    pub node: usize,
    /// 1-based paragraph ordinal within the part, 0 if outside any paragraph
    pub paragraph: usize,
}

/// One translatable text unit taken from a single text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based sequential index, also the marker number
    pub index: usize,
    /// Original node text, unescaped
    pub text: String,
    /// Text of whitespace-only nodes skipped just before this one in the
    /// same paragraph
    #[serde(default)]
    pub gap: String,
    pub location: SegmentLocation,
    /// Present in rich mode only
    pub run: Option<RunAttributes>,
    /// Present in rich mode only
    pub paragraph: Option<ParagraphAttributes>,
}

impl Segment {
    /// Key identifying the paragraph across parts
    pub fn paragraph_key(&self) -> (usize, usize) {
        (self.location.part_index, self.location.paragraph)
    }
}

/// A part with every segment's content replaced by its marker
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPart {
    pub name: String,
    pub kind: PartKind,
    pub content: String,
    /// Number of markers spliced into this part
    pub marker_count: usize,
}

/// Structural copy of the document used to re-inject translations
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub delimiter: char,
    pub parts: Vec<SkeletonPart>,
}

impl Skeleton {
    /// Total markers across parts
    pub fn marker_count(&self) -> usize {
        self.parts.iter().map(|part| part.marker_count).sum()
    }
}

/// Everything extraction produces for one document
#[derive(Debug, Clone)]
pub struct Extraction {
    pub delimiter: char,
    /// `delimiter + text` for every segment, in order
    pub parsed_text: String,
    pub skeleton: Skeleton,
    pub segments: Vec<Segment>,
}

/// Turns document parts into segments and a skeleton
#[derive(Debug, Clone)]
pub struct Extractor {
    delimiters: Vec<char>,
    record_attributes: bool,
    plain_text_max_segment_chars: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            record_attributes: false,
            plain_text_max_segment_chars: 2000,
        }
    }
}

impl Extractor {
    /// Create an extractor with the default delimiter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the delimiter priority list
    pub fn with_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Record run and paragraph formatting for each segment
    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.record_attributes = enabled;
        self
    }

    /// Longest plain-text paragraph kept as a single segment
    pub fn with_plain_text_max_segment_chars(mut self, max_chars: usize) -> Self {
        self.plain_text_max_segment_chars = max_chars.max(1);
        self
    }

    /// Extract segments from `parts` in order.
    ///
    /// Whitespace-only nodes are left in place: no marker, no index, no
    /// segment. Their text is kept as the next segment's `gap`.
    pub fn extract(&self, parts: &[SourcePart<'_>]) -> Result<Extraction> {
        let scanned = parts.iter().map(|part| self.scan(part)).collect::<Result<Vec<_>>>()?;

        // Character references only show up after unescaping, so node text counts too
        let sources: Vec<&str> = parts
            .iter()
            .map(|part| part.content)
            .chain(scanned.iter().flatten().map(|node| node.text.as_str()))
            .collect();
        let delimiter = choose_delimiter(&self.delimiters, &sources)?;

        let mut segments: Vec<Segment> = Vec::new();
        let mut parsed_text = String::new();
        let mut skeleton_parts = Vec::with_capacity(parts.len());

        for ((part_index, part), nodes) in parts.iter().enumerate().zip(scanned) {
            let mut content = String::with_capacity(part.content.len());
            let mut cursor = 0;
            let mut marker_count = 0;
            let mut gap = String::new();
            let mut gap_paragraph = 0;

            for (node_index, node) in nodes.into_iter().enumerate() {
                if node.text.trim().is_empty() {
                    if node.paragraph != gap_paragraph {
                        gap.clear();
                        gap_paragraph = node.paragraph;
                    }
                    gap.push_str(&node.text);
                    continue;
                }
                let leading_gap = if node.paragraph == gap_paragraph && node.paragraph != 0 {
                    std::mem::take(&mut gap)
                } else {
                    gap.clear();
                    String::new()
                };
                gap_paragraph = node.paragraph;

                let index = segments.len() + 1;
                parsed_text.push(delimiter);
                parsed_text.push_str(&node.text);

                content.push_str(&part.content[cursor..node.start]);
                content.push_str(&marker(delimiter, index));
                cursor = node.end;
                marker_count += 1;

                segments.push(Segment {
                    index,
                    text: node.text,
                    gap: leading_gap,
                    location: SegmentLocation {
                        part: part.name.to_string(),
                        part_index,
                        node: node_index,
                        paragraph: node.paragraph,
                    },
                    run: node.run,
                    paragraph: node.paragraph_attributes,
                });
            }
            content.push_str(&part.content[cursor..]);

            debug!("Part {}: {} segments", part.name, marker_count);
            skeleton_parts.push(SkeletonPart {
                name: part.name.to_string(),
                kind: part.kind,
                content,
                marker_count,
            });
        }

        info!(
            "Extracted {} segments from {} parts using delimiter {:?}",
            segments.len(),
            parts.len(),
            delimiter
        );

        Ok(Extraction {
            delimiter,
            parsed_text,
            skeleton: Skeleton {
                delimiter,
                parts: skeleton_parts,
            },
            segments,
        })
    }

    fn scan(&self, part: &SourcePart<'_>) -> Result<Vec<TextNode>> {
        match part.kind {
            PartKind::Xml => scan_xml(part.name, part.content, self.record_attributes),
            PartKind::PlainText => Ok(scan_plain_text(part.content, self.plain_text_max_segment_chars)),
        }
    }
}
