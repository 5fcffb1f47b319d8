/*!
 * Delimiter selection and marker syntax.
 *
 * A marker is the delimiter immediately followed by a 1-based decimal
 * segment index, e.g. `§12`. The delimiter is picked per document so it
 * never collides with real content.
 */

use log::debug;

use crate::errors::{PipelineError, Result};

/// Rare symbols tried in order
pub const DEFAULT_DELIMITERS: &[char] = &['§', '¶', '†', '‡', '¤', '※', '◊', '¦', '‖', '⁂'];

/// Pick the first candidate that occurs in none of `sources`
pub fn choose_delimiter(candidates: &[char], sources: &[&str]) -> Result<char> {
    let chosen = candidates
        .iter()
        .copied()
        .find(|candidate| sources.iter().all(|source| !source.contains(*candidate)));

    match chosen {
        Some(delimiter) => {
            debug!("Chose delimiter {:?} from {} candidates", delimiter, candidates.len());
            Ok(delimiter)
        }
        None => Err(PipelineError::NoAvailableDelimiter(candidates.len())),
    }
}

/// Marker text for a segment
pub fn marker(delimiter: char, index: usize) -> String {
    format!("{}{}", delimiter, index)
}

/// Parse `text` as exactly one marker and return its index
pub fn parse_marker(delimiter: char, text: &str) -> Option<usize> {
    let digits = text.strip_prefix(delimiter)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Byte ranges and indices of every marker embedded in `text`, in order
pub fn find_markers(delimiter: char, text: &str) -> Vec<(std::ops::Range<usize>, usize)> {
    let mut markers = Vec::new();
    for (start, _) in text.match_indices(delimiter) {
        let digits_start = start + delimiter.len_utf8();
        let digits_len = text[digits_start..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits_len == 0 {
            continue;
        }
        let end = digits_start + digits_len;
        if let Ok(index) = text[digits_start..end].parse() {
            markers.push((start..end, index));
        }
    }
    markers
}
