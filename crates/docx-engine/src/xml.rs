//! Low-level WordprocessingML text utilities
//!
//! The engine edits part XML as text, locating elements by byte range and
//! splicing replacements back in. Offsets always refer to the unmodified
//! input string; batched edits are applied in reverse document order so
//! earlier ranges stay valid.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A `<w:t>` element: either self-closing or with text content.
    /// Text content cannot contain `<`, so a simple negated class is exact.
    static ref TEXT_ELEMENT: Regex =
        Regex::new(r"<w:t(?:\s[^>]*?)?(?:/>|>([^<]*)</w:t>)").expect("invalid regex");
}

/// Escape the XML metacharacters that may occur in replacement text.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Decode the five predefined XML entities.
///
/// `&amp;` is decoded last so that `&amp;lt;` becomes the literal `&lt;`.
pub fn unescape_text(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Content ranges of every non-empty `<w:t>` element within `within`,
/// as absolute byte ranges into `xml`.
pub fn text_content_ranges(xml: &str, within: Range<usize>) -> Vec<Range<usize>> {
    let slice = &xml[within.clone()];
    TEXT_ELEMENT
        .captures_iter(slice)
        .filter_map(|caps| caps.get(1))
        .map(|m| within.start + m.start()..within.start + m.end())
        .collect()
}

/// Apply a batch of non-overlapping edits to `xml`.
///
/// Edits are applied highest-offset first. An edit overlapping one already
/// applied indicates a scanning bug; it is dropped with a warning rather
/// than corrupting the part.
pub fn splice_all(xml: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut out = xml.to_string();
    let mut applied_start = usize::MAX;
    for (range, text) in edits {
        if range.end > applied_start {
            tracing::warn!(
                start = range.start,
                end = range.end,
                "skipping overlapping edit"
            );
            continue;
        }
        applied_start = range.start;
        out.replace_range(range, &text);
    }
    out
}
