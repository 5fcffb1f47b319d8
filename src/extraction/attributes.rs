/*!
 * Run and paragraph formatting captured in rich extraction mode.
 *
 * Only what a caller needs to reason about fidelity is recorded. The
 * pipeline never rewrites formatting; these values are read-only metadata.
 */

use quick_xml::events::BytesStart;
use serde::{Deserialize, Serialize};

/// Character-level formatting of the run holding a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAttributes {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Hex RGB, e.g. `FF0000`
    pub color: Option<String>,
    pub font: Option<String>,
    /// Font size in half-points (WordprocessingML `w:sz` unit)
    pub size_half_points: Option<u32>,
}

/// Paragraph-level formatting of the paragraph holding a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphAttributes {
    /// Style identifier, e.g. `Heading1`
    pub style: Option<String>,
    pub heading_level: Option<u8>,
    pub alignment: Option<String>,
    /// Twentieths of a point
    pub spacing_before: Option<u32>,
    pub spacing_after: Option<u32>,
    pub line_spacing: Option<u32>,
    /// Twentieths of a point; negative when hanging
    pub indent_left: Option<i32>,
    pub indent_right: Option<i32>,
    pub indent_first_line: Option<i32>,
}

/// Value of the attribute whose local name is `local`
pub(crate) fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn toggle(e: &BytesStart<'_>) -> bool {
    !matches!(
        attribute(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

fn number<T: std::str::FromStr>(e: &BytesStart<'_>, local: &[u8]) -> Option<T> {
    attribute(e, local).and_then(|value| value.parse().ok())
}

impl RunAttributes {
    /// Apply one child of `w:rPr`
    pub(crate) fn apply_word_property(&mut self, local: &[u8], e: &BytesStart<'_>) {
        match local {
            b"b" => self.bold = toggle(e),
            b"i" => self.italic = toggle(e),
            b"u" => self.underline = attribute(e, b"val").map(|v| v != "none").unwrap_or(true),
            b"color" => self.color = attribute(e, b"val").filter(|v| v != "auto"),
            b"rFonts" => {
                self.font = attribute(e, b"ascii")
                    .or_else(|| attribute(e, b"hAnsi"))
                    .or_else(|| attribute(e, b"cs"));
            }
            b"sz" => self.size_half_points = number(e, b"val"),
            _ => {}
        }
    }

    /// Apply the attributes of a DrawingML `a:rPr`
    pub(crate) fn apply_drawing_properties(&mut self, e: &BytesStart<'_>) {
        if let Some(bold) = attribute(e, b"b") {
            self.bold = bold == "1" || bold == "true";
        }
        if let Some(italic) = attribute(e, b"i") {
            self.italic = italic == "1" || italic == "true";
        }
        if let Some(underline) = attribute(e, b"u") {
            self.underline = underline != "none";
        }
        // DrawingML sizes are hundredths of a point
        if let Some(size) = number::<u32>(e, b"sz") {
            self.size_half_points = Some(size / 50);
        }
    }

    /// Apply a DrawingML `a:latin` typeface
    pub(crate) fn apply_drawing_font(&mut self, e: &BytesStart<'_>) {
        self.font = attribute(e, b"typeface");
    }
}

impl ParagraphAttributes {
    /// Apply one child of `w:pPr`
    pub(crate) fn apply_word_property(&mut self, local: &[u8], e: &BytesStart<'_>) {
        match local {
            b"pStyle" => {
                self.style = attribute(e, b"val");
                if self.heading_level.is_none() {
                    self.heading_level = self.style.as_deref().and_then(heading_level_from_style);
                }
            }
            b"outlineLvl" => {
                self.heading_level = number::<u8>(e, b"val").filter(|level| *level < 9).map(|level| level + 1);
            }
            b"jc" => self.alignment = attribute(e, b"val"),
            b"spacing" => {
                self.spacing_before = number(e, b"before");
                self.spacing_after = number(e, b"after");
                self.line_spacing = number(e, b"line");
            }
            b"ind" => {
                self.indent_left = number(e, b"left").or_else(|| number(e, b"start"));
                self.indent_right = number(e, b"right").or_else(|| number(e, b"end"));
                self.indent_first_line = number::<i32>(e, b"firstLine")
                    .or_else(|| number::<i32>(e, b"hanging").map(|hanging| -hanging));
            }
            _ => {}
        }
    }
}

/// `Heading3` / `heading 3` -> 3, `Title` -> 1
fn heading_level_from_style(style: &str) -> Option<u8> {
    let lower = style.to_lowercase();
    if lower == "title" {
        return Some(1);
    }
    let digits = lower.strip_prefix("heading")?.trim();
    digits.parse::<u8>().ok().filter(|level| (1..=9).contains(level))
}
