//! Removal of unfilled placeholder paragraphs and table rows
//!
//! After substitution, any paragraph or table row still carrying a
//! segment-grammar token was never filled and is dropped wholesale.
//! Ranges are collected against one index and spliced in a single
//! batch, so earlier removals cannot shift later offsets.

use std::ops::Range;

use crate::scan::{Container, PartIndex};
use crate::xml;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub paragraphs_removed: usize,
    pub rows_removed: usize,
}

/// Remove body paragraphs and table rows whose text still contains any
/// of `placeholders`. Whitespace-only content never triggers removal.
pub fn remove_unfilled(xml_text: &str, placeholders: &[String]) -> (String, CleanupStats) {
    if placeholders.is_empty() {
        return (xml_text.to_string(), CleanupStats::default());
    }

    let index = PartIndex::scan(xml_text);
    let mut removals: Vec<Range<usize>> = Vec::new();
    let mut stats = CleanupStats::default();

    for (i, para) in index.paragraphs.iter().enumerate() {
        if para.container != Container::Body {
            continue;
        }
        let text = index.paragraph_text(xml_text, i);
        if text.trim().is_empty() {
            continue;
        }
        if placeholders.iter().any(|p| text.contains(p)) {
            removals.push(para.range.clone());
            stats.paragraphs_removed += 1;
        }
    }

    for table in &index.tables {
        for row in &table.rows {
            let cell_texts: Vec<String> = row
                .cells
                .iter()
                .map(|c| index.cell_text(xml_text, c))
                .collect();
            if cell_texts.join("").trim().is_empty() {
                continue;
            }
            if cell_texts
                .iter()
                .any(|t| placeholders.iter().any(|p| t.contains(p)))
            {
                removals.push(row.range.clone());
                stats.rows_removed += 1;
            }
        }
    }

    if removals.is_empty() {
        return (xml_text.to_string(), stats);
    }
    let edits = removals.into_iter().map(|r| (r, String::new())).collect();
    (xml::splice_all(xml_text, edits), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(inner: &str) -> String {
        format!(
            "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{inner}</w:body></w:document>"
        )
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_paragraphs_still_holding_placeholders() {
        let xml = body(&format!(
            "{}{}{}",
            para("Retail segment"),
            para("Details: {{Segment3}}"),
            para("Closing remarks"),
        ));
        let (out, stats) = remove_unfilled(&xml, &tokens(&["{{Segment3}}"]));
        assert_eq!(stats.paragraphs_removed, 1);
        assert_eq!(stats.rows_removed, 0);
        assert!(!out.contains("{{Segment3}}"));
        assert!(out.contains("Retail segment"));
        assert!(out.contains("Closing remarks"));
    }

    #[test]
    fn whitespace_only_paragraphs_are_kept() {
        let xml = body(&format!("{}{}", para("   "), para("kept")));
        let (out, stats) = remove_unfilled(&xml, &tokens(&["{{Segment1}}"]));
        assert_eq!(stats, CleanupStats::default());
        assert_eq!(out, xml);
    }

    #[test]
    fn drops_whole_row_when_any_cell_holds_a_placeholder() {
        let xml = body(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Share</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:p><w:r><w:t>{{Segment2Sub-segment1}}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>12%</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let (out, stats) = remove_unfilled(&xml, &tokens(&["{{Segment2Sub-segment1}}"]));
        assert_eq!(stats.rows_removed, 1);
        assert!(out.contains("Name"));
        assert!(out.contains("Share"));
        assert!(!out.contains("12%"));
    }

    #[test]
    fn rows_with_only_empty_cells_survive() {
        let xml = body(
            "<w:tbl><w:tr><w:tc><w:p/></w:tc><w:tc><w:p><w:r><w:t>  </w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let (out, stats) = remove_unfilled(&xml, &tokens(&["{{Segment1}}"]));
        assert_eq!(stats, CleanupStats::default());
        assert_eq!(out, xml);
    }

    #[test]
    fn cell_paragraphs_do_not_count_as_body_paragraphs() {
        // The placeholder sits in a cell, so the row goes but no body
        // paragraph is touched.
        let xml = body(&format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("intro"),
            para("{{Segments4}}"),
        ));
        let (out, stats) = remove_unfilled(&xml, &tokens(&["{{Segments4}}"]));
        assert_eq!(stats.paragraphs_removed, 0);
        assert_eq!(stats.rows_removed, 1);
        assert!(out.contains("intro"));
    }

    #[test]
    fn unrelated_brace_tokens_are_preserved() {
        let xml = body(&format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("See {{TotallyUnrelated}} for details"),
            para("Gone: {{Segment3}}"),
            para("{{AnotherOddToken}}"),
            para("12%"),
        ));
        // Match against the full grammar: only literal grammar tokens
        // trigger removal, any other {{...}} text is left alone.
        let placeholders =
            crate::grammar::cleanup_placeholders(&std::collections::HashSet::new());
        let (out, stats) = remove_unfilled(&xml, &placeholders);
        assert_eq!(stats.paragraphs_removed, 1);
        assert_eq!(stats.rows_removed, 0);
        assert!(out.contains("{{TotallyUnrelated}}"));
        assert!(out.contains("{{AnotherOddToken}}"));
        assert!(!out.contains("{{Segment3}}"));
    }

    #[test]
    fn multiple_placeholders_in_one_paragraph_remove_it_once() {
        let xml = body(&para("{{Segment1}} {{Segment2}}"));
        let (out, stats) =
            remove_unfilled(&xml, &tokens(&["{{Segment1}}", "{{Segment2}}"]));
        assert_eq!(stats.paragraphs_removed, 1);
        assert!(!out.contains("{{Segment"));
    }
}
