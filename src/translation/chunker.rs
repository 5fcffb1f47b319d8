/*!
 * Chunking of translation units and text streams.
 *
 * `chunk_units` groups units into provider-sized batches; `split_stream`
 * cuts a flat text stream at paragraph, then sentence boundaries. Both keep
 * coverage exact: every unit (or byte of text) lands in exactly one chunk,
 * in order.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::units::TranslationUnit;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n\s*").expect("valid paragraph break pattern"));

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?。！？…]["'”’)\]]*\s+"#).expect("valid sentence end pattern"));

/// Per-chunk budget; `None` leaves that dimension unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkLimits {
    pub max_units: Option<usize>,
    pub max_chars: Option<usize>,
}

impl ChunkLimits {
    pub fn new(max_units: Option<usize>, max_chars: Option<usize>) -> Self {
        Self {
            max_units: max_units.map(|n| n.max(1)),
            max_chars: max_chars.map(|n| n.max(1)),
        }
    }

    /// Bounded by unit count only
    pub fn units(max_units: usize) -> Self {
        Self::new(Some(max_units), None)
    }

    /// Bounded by characters only
    pub fn chars(max_chars: usize) -> Self {
        Self::new(None, Some(max_chars))
    }

    fn allows(&self, units: usize, chars: usize) -> bool {
        self.max_units.is_none_or(|max| units <= max) && self.max_chars.is_none_or(|max| chars <= max)
    }
}

/// A contiguous range of units sent in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in chunk order
    pub index: usize,
    /// First unit, inclusive
    pub start: usize,
    /// Last unit, exclusive
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Characters a unit costs in a request, counting its delimiter
pub fn unit_cost(unit: &TranslationUnit) -> usize {
    1 + unit.text.chars().count()
}

/// Pack `units` greedily into chunks bounded by `limits`.
///
/// When the next unit does not fit, the chunk is cut at the last paragraph
/// boundary it contains, or just before the unit if there is none. A unit
/// that alone exceeds the budget becomes its own chunk.
pub fn chunk_units(units: &[TranslationUnit], limits: ChunkLimits) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = 0;
    let mut i = 0;

    while i < units.len() {
        let cost = unit_cost(&units[i]);
        let count = i - start;
        if count == 0 || limits.allows(count + 1, chars + cost) {
            chars += cost;
            i += 1;
            continue;
        }

        let cut = (start + 1..=i)
            .rev()
            .find(|&j| units[j].paragraph != units[j - 1].paragraph)
            .unwrap_or(i);

        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end: cut,
        });
        start = cut;
        chars = units[cut..i].iter().map(unit_cost).sum();
    }

    if start < units.len() {
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end: units.len(),
        });
    }

    debug!("Packed {} units into {} chunks ({:?})", units.len(), chunks.len(), limits);
    chunks
}

/// Split a flat stream into pieces of at most `max_chars` characters.
///
/// Paragraph boundaries are preferred; a paragraph over budget is cut at
/// sentence ends, and a sentence over budget is emitted whole. With a
/// `delimiter`, cuts only fall right before a delimiter so no delimited
/// segment is ever split. Concatenating the pieces yields `text`.
pub fn split_stream(text: &str, max_chars: usize, delimiter: Option<char>) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let max_chars = max_chars.max(1);

    let atoms: Vec<&str> = match delimiter {
        Some(delimiter) => split_before(text, delimiter),
        None => split_after(text, &PARAGRAPH_BREAK)
            .into_iter()
            .flat_map(|paragraph| {
                if paragraph.chars().count() > max_chars {
                    split_after(paragraph, &SENTENCE_END)
                } else {
                    vec![paragraph]
                }
            })
            .collect(),
    };

    pack(&atoms, max_chars)
}

/// Pieces ending right after each match of `pattern`
fn split_after<'a>(text: &'a str, pattern: &Regex) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for found in pattern.find_iter(text) {
        if found.end() > start {
            pieces.push(&text[start..found.end()]);
            start = found.end();
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Pieces starting at each occurrence of `delimiter`
fn split_before(text: &str, delimiter: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (position, _) in text.match_indices(delimiter) {
        if position > start {
            pieces.push(&text[start..position]);
            start = position;
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn pack(atoms: &[&str], max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for atom in atoms {
        let atom_chars = atom.chars().count();
        if current_chars > 0 && current_chars + atom_chars > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push_str(atom);
        current_chars += atom_chars;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
