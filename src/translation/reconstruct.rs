/*!
 * Reconstruction: translated responses back into the skeleton.
 *
 * Each chunk response is split by the document delimiter and matched to
 * the units that were sent. Anything that cannot be matched safely falls
 * back to the original text, so a marker never survives into the output
 * and a translation is never attached to the wrong segment.
 */

use log::{debug, info, warn};
use quick_xml::escape::partial_escape;

use super::batch::ChunkTranslation;
use super::units::{RedistributionPolicy, TranslationUnit, preserve_whitespace, redistribute};
use crate::errors::{PipelineError, Result};
use crate::extraction::{PartKind, Segment, Skeleton, find_markers};

/// How a response lined up with its request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSplit {
    /// One piece per sent unit
    Complete(Vec<String>),
    /// Fewer pieces than sent units; the prefix is usable
    Partial(Vec<String>),
    /// No delimiter survived, or more pieces came back than were sent
    Corrupted { received: usize },
}

/// Split a chunk response into its delimited pieces.
///
/// Text before the first delimiter is dropped when blank and counted as a
/// piece otherwise.
pub fn split_response(response: &str, delimiter: char, expected: usize) -> ResponseSplit {
    let mut pieces: Vec<String> = response.split(delimiter).map(str::to_string).collect();
    if pieces.first().is_some_and(|prefix| prefix.trim().is_empty()) {
        pieces.remove(0);
    }

    let received = pieces.len();
    if !response.contains(delimiter) || received > expected || received == 0 {
        ResponseSplit::Corrupted { received }
    } else if received == expected {
        ResponseSplit::Complete(pieces)
    } else {
        ResponseSplit::Partial(pieces)
    }
}

/// A per-chunk condition surfaced to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkIssue {
    pub chunk_index: usize,
    pub error: PipelineError,
}

/// Final text for every segment plus what happened along the way
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Text per segment, position `index - 1`
    pub segment_texts: Vec<String>,
    pub translated_units: usize,
    pub passthrough_units: usize,
    pub fallback_units: usize,
    pub issues: Vec<ChunkIssue>,
}

/// A skeleton part with every marker replaced
#[derive(Debug, Clone, PartialEq)]
pub struct RebuiltPart {
    pub name: String,
    pub kind: PartKind,
    pub content: String,
    /// Markers replaced; zero means the content is unchanged
    pub marker_count: usize,
}

/// Matches translations to segments and splices them into the skeleton
#[derive(Debug, Clone)]
pub struct Reconstructor {
    delimiter: char,
    policy: RedistributionPolicy,
}

impl Reconstructor {
    pub fn new(delimiter: char, policy: RedistributionPolicy) -> Self {
        Self { delimiter, policy }
    }

    /// Decide the final text of every segment from the chunk results.
    ///
    /// `results` must be in chunk order. Units not covered by any sent
    /// request keep their original text.
    pub fn resolve(&self, segments: &[Segment], units: &[TranslationUnit], results: &[ChunkTranslation]) -> Resolution {
        let mut resolution = Resolution {
            segment_texts: segments.iter().map(|segment| segment.text.clone()).collect(),
            ..Resolution::default()
        };

        for result in results {
            let chunk_index = result.chunk.index;
            resolution.passthrough_units += result.chunk.len() - result.sent.len();

            let response = match &result.response {
                None => continue,
                Some(Err(e)) => {
                    warn!("Chunk {} falls back to original text: {}", chunk_index + 1, e);
                    resolution.fallback_units += result.sent.len();
                    resolution.issues.push(ChunkIssue {
                        chunk_index,
                        error: PipelineError::from_provider(chunk_index, e),
                    });
                    continue;
                }
                Some(Ok(response)) => response,
            };

            let expected = result.sent.len();
            let pieces = match split_response(response, self.delimiter, expected) {
                ResponseSplit::Complete(pieces) => pieces,
                ResponseSplit::Partial(pieces) => {
                    warn!(
                        "Chunk {} came back with {} of {} segments; the rest keep original text",
                        chunk_index + 1,
                        pieces.len(),
                        expected
                    );
                    resolution.issues.push(ChunkIssue {
                        chunk_index,
                        error: PipelineError::TranslationDegraded {
                            chunk: chunk_index,
                            expected,
                            received: pieces.len(),
                        },
                    });
                    pieces
                }
                ResponseSplit::Corrupted { received } => {
                    warn!(
                        "Chunk {} response is corrupted ({} pieces for {} segments); chunk keeps original text",
                        chunk_index + 1,
                        received,
                        expected
                    );
                    resolution.issues.push(ChunkIssue {
                        chunk_index,
                        error: PipelineError::TranslationDegraded {
                            chunk: chunk_index,
                            expected,
                            received,
                        },
                    });
                    Vec::new()
                }
            };

            resolution.fallback_units += expected - pieces.len();
            for (&position, piece) in result.sent.iter().zip(&pieces) {
                self.assign(&units[position], piece, segments, &mut resolution.segment_texts);
                resolution.translated_units += 1;
            }
        }

        debug!(
            "Resolved {} units: {} translated, {} passthrough, {} fallback",
            units.len(),
            resolution.translated_units,
            resolution.passthrough_units,
            resolution.fallback_units
        );
        resolution
    }

    fn assign(&self, unit: &TranslationUnit, piece: &str, segments: &[Segment], texts: &mut [String]) {
        let translated = preserve_whitespace(&unit.text, piece);
        let members: Vec<&Segment> = unit.members.iter().filter_map(|index| segments.get(index - 1)).collect();
        let originals: Vec<&str> = members.iter().map(|segment| segment.text.as_str()).collect();

        let mut pieces = redistribute(&translated, &originals, self.policy);
        // An unmarked whitespace run already separates these two members
        for position in 1..pieces.len().min(members.len()) {
            if !members[position].gap.is_empty() {
                let kept = pieces[position - 1].trim_end().len();
                pieces[position - 1].truncate(kept);
                pieces[position] = pieces[position].trim_start().to_string();
            }
        }

        for (index, text) in unit.members.iter().zip(pieces) {
            if let Some(slot) = texts.get_mut(index - 1) {
                *slot = text;
            }
        }
    }

    /// Replace every marker in the skeleton with its segment text.
    ///
    /// XML parts get the text escaped; plain-text parts take it verbatim.
    pub fn apply(&self, skeleton: &Skeleton, segment_texts: &[String]) -> Result<Vec<RebuiltPart>> {
        let mut parts = Vec::with_capacity(skeleton.parts.len());

        for part in &skeleton.parts {
            let mut content = String::with_capacity(part.content.len());
            let mut cursor = 0;

            for (range, index) in find_markers(skeleton.delimiter, &part.content) {
                let Some(text) = index.checked_sub(1).and_then(|i| segment_texts.get(i)) else {
                    return Err(PipelineError::InvalidContainer(format!(
                        "marker {} in {} matches no segment",
                        index, part.name
                    )));
                };

                content.push_str(&part.content[cursor..range.start]);
                match part.kind {
                    PartKind::Xml => content.push_str(&partial_escape(text.as_str())),
                    PartKind::PlainText => content.push_str(text),
                }
                cursor = range.end;
            }
            content.push_str(&part.content[cursor..]);

            parts.push(RebuiltPart {
                name: part.name.clone(),
                kind: part.kind,
                content,
                marker_count: part.marker_count,
            });
        }

        info!("Reconstructed {} parts", parts.len());
        Ok(parts)
    }
}
