/*!
 * Text-node scanning.
 *
 * Both scanners report byte spans into the part they scan, so the skeleton
 * can be produced by splicing the original text. Nothing outside a span is
 * ever rewritten.
 *
 * XML parts are walked with a namespace-aware reader. Text nodes are the
 * contents of `t` elements in the WordprocessingML and DrawingML
 * namespaces, whatever prefix the document binds them to.
 */

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::attributes::{ParagraphAttributes, RunAttributes};
use crate::errors::{PipelineError, Result};
use crate::translation::chunker::split_stream;

/// WordprocessingML main namespace
pub const WORD_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// DrawingML main namespace (shapes, text boxes, SmartArt)
pub const DRAWING_NS: &[u8] = b"http://schemas.openxmlformats.org/drawingml/2006/main";

/// One text node found in a part
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// Byte offset where the node content starts
    pub start: usize,
    /// Byte offset one past the node content
    pub end: usize,
    /// Unescaped content
    pub text: String,
    /// 1-based ordinal of the enclosing paragraph within the part, 0 if none
    pub paragraph: usize,
    pub run: Option<RunAttributes>,
    pub paragraph_attributes: Option<ParagraphAttributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Word,
    Drawing,
    Other,
}

impl Namespace {
    fn of(resolved: &ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(ns) if ns.as_ref() == WORD_NS => Self::Word,
            ResolveResult::Bound(ns) if ns.as_ref() == DRAWING_NS => Self::Drawing,
            _ => Self::Other,
        }
    }

    fn is_text_bearing(self) -> bool {
        self != Self::Other
    }
}

#[derive(Default)]
struct ScanState {
    paragraph_count: usize,
    paragraphs: Vec<(usize, ParagraphAttributes)>,
    runs: Vec<RunAttributes>,
    in_paragraph_properties: bool,
    in_run_properties: bool,
    cursor: usize,
}

impl ScanState {
    fn open_element(&mut self, ns: Namespace, local: &[u8], e: &BytesStart<'_>, record: bool) {
        match (ns, local) {
            (Namespace::Word | Namespace::Drawing, b"p") => {
                self.paragraph_count += 1;
                self.paragraphs.push((self.paragraph_count, ParagraphAttributes::default()));
            }
            (Namespace::Word | Namespace::Drawing, b"r") => self.runs.push(RunAttributes::default()),
            (Namespace::Word, b"pPr") => self.in_paragraph_properties = true,
            (Namespace::Word, b"rPr") if !self.in_paragraph_properties => self.in_run_properties = true,
            (Namespace::Drawing, b"rPr") if record => {
                if let Some(run) = self.runs.last_mut() {
                    run.apply_drawing_properties(e);
                }
                self.in_run_properties = true;
            }
            _ => {}
        }
    }

    fn property(&mut self, ns: Namespace, local: &[u8], e: &BytesStart<'_>) {
        match ns {
            Namespace::Word if self.in_run_properties => {
                if let Some(run) = self.runs.last_mut() {
                    run.apply_word_property(local, e);
                }
            }
            Namespace::Word if self.in_paragraph_properties => {
                if let Some((_, paragraph)) = self.paragraphs.last_mut() {
                    paragraph.apply_word_property(local, e);
                }
            }
            Namespace::Drawing if self.in_run_properties && local == b"latin" => {
                if let Some(run) = self.runs.last_mut() {
                    run.apply_drawing_font(e);
                }
            }
            _ => {}
        }
    }

    fn close_element(&mut self, ns: Namespace, local: &[u8]) {
        match (ns, local) {
            (Namespace::Word | Namespace::Drawing, b"p") => {
                self.paragraphs.pop();
            }
            (Namespace::Word | Namespace::Drawing, b"r") => {
                self.runs.pop();
            }
            (Namespace::Word, b"pPr") => self.in_paragraph_properties = false,
            (Namespace::Word | Namespace::Drawing, b"rPr") => self.in_run_properties = false,
            _ => {}
        }
    }

    fn current_paragraph(&self) -> usize {
        self.paragraphs.last().map(|(ordinal, _)| *ordinal).unwrap_or(0)
    }
}

/// Find every `w:t` / `a:t` text node in an XML part, in document order.
///
/// With `record_attributes` the enclosing run and paragraph formatting is
/// captured for each node.
pub fn scan_xml(part_name: &str, xml: &str, record_attributes: bool) -> Result<Vec<TextNode>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut state = ScanState::default();
    let mut nodes = Vec::new();

    loop {
        let (ns, event) = {
            let (resolved, event) = reader.read_resolved_event().map_err(|e| malformed(part_name, e))?;
            (Namespace::of(&resolved), event)
        };

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                let local = local.as_ref();
                if ns.is_text_bearing() && local == b"t" {
                    let tag_end = reader.buffer_position() as usize;
                    if let Some(mut node) = locate_content(xml, tag_end, &e, &mut state.cursor, part_name)? {
                        node.paragraph = state.current_paragraph();
                        if record_attributes {
                            node.run = Some(state.runs.last().cloned().unwrap_or_default());
                            node.paragraph_attributes =
                                Some(state.paragraphs.last().map(|(_, p)| p.clone()).unwrap_or_default());
                        }
                        nodes.push(node);
                    }
                } else {
                    state.open_element(ns, local, &e, record_attributes);
                    if record_attributes {
                        state.property(ns, local, &e);
                    }
                }
            }
            Event::Empty(e) => {
                if record_attributes {
                    let local = e.local_name();
                    if ns == Namespace::Drawing && local.as_ref() == b"rPr" {
                        if let Some(run) = state.runs.last_mut() {
                            run.apply_drawing_properties(&e);
                        }
                    } else {
                        state.property(ns, local.as_ref(), &e);
                    }
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                state.close_element(ns, local.as_ref());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(nodes)
}

/// Resolve the content span of a text element whose start tag ends at
/// `tag_end`. Returns `None` for content that is not plain character data
/// (comments, CDATA), which is left untouched.
fn locate_content(
    xml: &str,
    tag_end: usize,
    start: &BytesStart<'_>,
    cursor: &mut usize,
    part_name: &str,
) -> Result<Option<TextNode>> {
    let bytes = xml.as_bytes();
    let content_start = if tag_end > 0 && tag_end <= bytes.len() && bytes[tag_end - 1] == b'>' {
        tag_end
    } else {
        // Reader offsets disagree with the source (e.g. a skipped BOM); find the tag by text
        let tag = format!("<{}", String::from_utf8_lossy(start.name().as_ref()));
        let tag_start = xml[*cursor..]
            .find(&tag)
            .map(|pos| pos + *cursor)
            .ok_or_else(|| PipelineError::InvalidContainer(format!("cannot locate {} in {}", tag, part_name)))?;
        xml[tag_start..]
            .find('>')
            .map(|pos| tag_start + pos + 1)
            .ok_or_else(|| PipelineError::InvalidContainer(format!("unterminated {} in {}", tag, part_name)))?
    };

    let content_end = xml[content_start..]
        .find('<')
        .map(|pos| content_start + pos)
        .ok_or_else(|| PipelineError::InvalidContainer(format!("unterminated text node in {}", part_name)))?;
    *cursor = content_end;

    if !xml[content_end..].starts_with("</") {
        return Ok(None);
    }

    let raw = &xml[content_start..content_end];
    let text = quick_xml::escape::unescape(raw)
        .map_err(|e| PipelineError::InvalidContainer(format!("bad escape in {}: {}", part_name, e)))?
        .into_owned();

    Ok(Some(TextNode {
        start: content_start,
        end: content_end,
        text,
        paragraph: 0,
        run: None,
        paragraph_attributes: None,
    }))
}

fn malformed(part_name: &str, error: impl std::fmt::Display) -> PipelineError {
    PipelineError::InvalidContainer(format!("malformed XML in {}: {}", part_name, error))
}

/// Split plain text into paragraph nodes (blank-line separated blocks).
///
/// A paragraph longer than `max_segment_chars` is cut into sentence-sized
/// contiguous nodes so each fits a single translation call.
pub fn scan_plain_text(text: &str, max_segment_chars: usize) -> Vec<TextNode> {
    let mut nodes = Vec::new();
    let mut paragraph = 0;
    let mut block: Option<(usize, usize)> = None;
    let mut offset = 0;

    let flush = |block: (usize, usize), nodes: &mut Vec<TextNode>, paragraph: &mut usize| {
        *paragraph += 1;
        let (start, end) = block;
        let content = &text[start..end];
        let mut piece_start = start;
        for piece in split_stream(content, max_segment_chars, None) {
            let piece_end = piece_start + piece.len();
            nodes.push(TextNode {
                start: piece_start,
                end: piece_end,
                text: piece,
                paragraph: *paragraph,
                run: None,
                paragraph_attributes: None,
            });
            piece_start = piece_end;
        }
    };

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let line_start = offset;
        let line_end = offset + content.len();
        offset += line.len();

        if content.trim().is_empty() {
            if let Some(current) = block.take() {
                flush(current, &mut nodes, &mut paragraph);
            }
        } else {
            block = Some(match block {
                Some((start, _)) => (start, line_end),
                None => (line_start, line_end),
            });
        }
    }
    if let Some(current) = block.take() {
        flush(current, &mut nodes, &mut paragraph);
    }

    nodes
}
