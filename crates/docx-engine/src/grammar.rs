//! Placeholder token grammar
//!
//! Templates carry `{{...}}` tokens for the market name, up to six
//! segments with ten sub-segments each, ten company names, and the
//! start/end markers that delimit per-segment zones. Authors spell the
//! segment tokens inconsistently, so the cleanup set enumerates every
//! observed variant, not just the canonical form the substitution pass
//! fills.

use std::collections::HashSet;

pub const MAX_SEGMENTS: usize = 6;
pub const MAX_SUB_SEGMENTS: usize = 10;
pub const MAX_COMPANIES: usize = 10;

pub const MARKET_NAME_TOKEN: &str = "{{market_name}}";

/// Canonical segment-name token, `i` is 1-based.
pub fn segment_token(i: usize) -> String {
    format!("{{{{Segment{i}}}}}")
}

/// Pluralized misspelling some templates carry.
pub fn segment_token_plural(i: usize) -> String {
    format!("{{{{Segments{i}}}}}")
}

/// Canonical sub-segment token, `i` and `j` are 1-based.
pub fn sub_segment_token(i: usize, j: usize) -> String {
    format!("{{{{Segment{i}Sub-segment{j}}}}}")
}

/// Variant with a capitalized "Segment" after the hyphen.
pub fn sub_segment_token_capitalized(i: usize, j: usize) -> String {
    format!("{{{{Segment{i}Sub-Segment{j}}}}}")
}

/// Company-name token, `k` is 1-based.
pub fn company_token(k: usize) -> String {
    format!("{{{{Company{k}}}}}")
}

pub fn zone_start_marker(i: usize) -> String {
    format!("{{{{Segment{i}_Start}}}}")
}

pub fn zone_end_marker(i: usize) -> String {
    format!("{{{{Segment{i}_End}}}}")
}

/// Both zone markers for every segment slot.
pub fn zone_markers() -> Vec<String> {
    (1..=MAX_SEGMENTS)
        .flat_map(|i| [zone_start_marker(i), zone_end_marker(i)])
        .collect()
}

/// The segment-grammar tokens that remain placeholders after
/// substitution: every spelling variant for every slot, minus the
/// canonical tokens that were actually filled.
pub fn cleanup_placeholders(filled: &HashSet<String>) -> Vec<String> {
    let mut tokens = Vec::new();
    for i in 1..=MAX_SEGMENTS {
        tokens.push(segment_token(i));
        tokens.push(segment_token_plural(i));
        for j in 1..=MAX_SUB_SEGMENTS {
            tokens.push(sub_segment_token(i, j));
            tokens.push(sub_segment_token_capitalized(i, j));
        }
    }
    tokens.retain(|t| !filled.contains(t));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_have_the_template_spelling() {
        assert_eq!(segment_token(3), "{{Segment3}}");
        assert_eq!(segment_token_plural(3), "{{Segments3}}");
        assert_eq!(sub_segment_token(2, 7), "{{Segment2Sub-segment7}}");
        assert_eq!(sub_segment_token_capitalized(2, 7), "{{Segment2Sub-Segment7}}");
        assert_eq!(company_token(10), "{{Company10}}");
        assert_eq!(zone_start_marker(1), "{{Segment1_Start}}");
        assert_eq!(zone_end_marker(6), "{{Segment6_End}}");
    }

    #[test]
    fn cleanup_set_excludes_filled_tokens() {
        let mut filled = HashSet::new();
        filled.insert(segment_token(1));
        filled.insert(sub_segment_token(1, 1));
        let tokens = cleanup_placeholders(&filled);
        assert!(!tokens.contains(&segment_token(1)));
        assert!(!tokens.contains(&sub_segment_token(1, 1)));
        // Variant spellings are never filled, so they always remain.
        assert!(tokens.contains(&segment_token_plural(1)));
        assert!(tokens.contains(&sub_segment_token_capitalized(1, 1)));
        assert!(tokens.contains(&segment_token(2)));
    }

    #[test]
    fn cleanup_set_covers_every_slot_when_nothing_is_filled() {
        let tokens = cleanup_placeholders(&HashSet::new());
        // 6 segments x (2 name spellings + 10 sub-segments x 2 spellings)
        assert_eq!(tokens.len(), MAX_SEGMENTS * (2 + MAX_SUB_SEGMENTS * 2));
    }
}
