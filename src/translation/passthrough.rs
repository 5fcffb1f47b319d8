/*!
 * Units that are never sent for translation.
 *
 * Numbers, dates, times, reference codes and bare separators come back
 * mangled from translation providers often enough (digit grouping, date
 * reordering) that they are kept verbatim instead.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static PASSTHROUGH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\d.,:;/\\\-–—_()\[\]+%#*|$€£¥°'’]+$").expect("valid passthrough pattern")
});

/// Whether `text` is made only of digits, separators and symbols
pub fn is_passthrough(text: &str) -> bool {
    !text.trim().is_empty() && PASSTHROUGH.is_match(text)
}
