/*!
 * Translation units: what is actually sent to the provider.
 *
 * In segment mode every segment is its own unit. In paragraph mode the
 * segments of one paragraph are joined so the provider sees whole
 * sentences; the translation then has to be spread back over the original
 * runs, which is what `RedistributionPolicy` decides.
 */

use serde::{Deserialize, Serialize};

use crate::extraction::Segment;

/// Granularity of translation units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// One unit per text node
    #[default]
    Segment,
    /// One unit per paragraph
    Paragraph,
}

/// How a paragraph translation is spread over the paragraph's runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionPolicy {
    /// The first run receives the whole text, later runs are emptied
    #[default]
    FirstRun,
    /// Words are dealt out in proportion to each run's original length
    Proportional,
}

/// Text sent to the provider as one delimited entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// 1-based unit number
    pub id: usize,
    /// Joined original text of the members, including the whitespace of
    /// unmarked runs between them
    pub text: String,
    /// Indices of the member segments, in order
    pub members: Vec<usize>,
    /// `(part_index, paragraph)` of the members
    pub paragraph: (usize, usize),
}

/// Group segments into units of the given kind.
///
/// Segments outside any paragraph always stay on their own.
pub fn build_units(segments: &[Segment], kind: UnitKind) -> Vec<TranslationUnit> {
    let mut units: Vec<TranslationUnit> = Vec::new();

    for segment in segments {
        let key = segment.paragraph_key();
        if kind == UnitKind::Paragraph && key.1 != 0 {
            if let Some(last) = units.last_mut().filter(|unit| unit.paragraph == key) {
                // Whitespace-only runs carry no marker but still separate words
                last.text.push_str(&segment.gap);
                last.text.push_str(&segment.text);
                last.members.push(segment.index);
                continue;
            }
        }

        units.push(TranslationUnit {
            id: units.len() + 1,
            text: segment.text.clone(),
            members: vec![segment.index],
            paragraph: key,
        });
    }

    units
}

/// Wrap `translated` in the leading and trailing whitespace of `original`
pub fn preserve_whitespace(original: &str, translated: &str) -> String {
    let trimmed = translated.trim();
    if original.trim().is_empty() {
        return translated.to_string();
    }
    let leading = &original[..original.len() - original.trim_start().len()];
    let trailing = &original[original.trim_end().len()..];
    format!("{}{}{}", leading, trimmed, trailing)
}

/// Spread a unit translation over its member texts.
///
/// Returns one string per entry of `originals`; concatenated they equal
/// `translated`.
pub fn redistribute(translated: &str, originals: &[&str], policy: RedistributionPolicy) -> Vec<String> {
    match originals.len() {
        0 => Vec::new(),
        1 => vec![translated.to_string()],
        count => match policy {
            RedistributionPolicy::FirstRun => {
                let mut pieces = vec![String::new(); count];
                pieces[0] = translated.to_string();
                pieces
            }
            RedistributionPolicy::Proportional => proportional(translated, originals),
        },
    }
}

fn proportional(translated: &str, originals: &[&str]) -> Vec<String> {
    let weights: Vec<usize> = originals.iter().map(|text| text.chars().count()).collect();
    let total_weight: usize = weights.iter().sum::<usize>().max(1);
    let total_chars = translated.chars().count();

    // Character position where each member's share ends
    let mut boundaries = Vec::with_capacity(weights.len());
    let mut cumulative = 0;
    for weight in &weights {
        cumulative += weight;
        boundaries.push(total_chars * cumulative / total_weight);
    }

    let mut pieces = vec![String::new(); originals.len()];
    let mut position = 0;
    let mut member = 0;
    for word in translated.split_inclusive(char::is_whitespace) {
        while member + 1 < pieces.len() && position >= boundaries[member] {
            member += 1;
        }
        pieces[member].push_str(word);
        position += word.chars().count();
    }
    pieces
}
