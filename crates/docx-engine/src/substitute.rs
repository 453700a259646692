//! Token substitution over part XML
//!
//! Matching is defined on a paragraph's own concatenated text, so a
//! token split across runs (Word fragments text on spell-check and
//! formatting boundaries) is still found. Two write paths:
//!
//! * every occurrence sits inside a single `<w:t>` element: the text of
//!   those elements is rewritten in place and run formatting survives;
//! * an occurrence spans elements: the paragraph is rebuilt as its
//!   opening tag, its `<w:pPr>` if any, and one run holding the full
//!   replaced text. Per-run formatting inside the paragraph is lost.
//!
//! A paragraph that hosts nested paragraphs (text boxes) is never
//! rebuilt; a spanning occurrence there is left alone and logged.

use lazy_static::lazy_static;
use regex::Regex;

use crate::scan::PartIndex;
use crate::xml;

lazy_static! {
    static ref PARAGRAPH_PROPERTIES: Regex =
        Regex::new(r"<w:pPr(?:\s[^>]*?)?(?:/>|>(?s:.*?)</w:pPr>)").expect("invalid regex");
}

/// Replace every occurrence of `token` in the part, returning the new
/// XML and the number of occurrences replaced.
pub fn replace_in_part(xml_text: &str, token: &str, replacement: &str) -> (String, usize) {
    if token.is_empty() {
        return (xml_text.to_string(), 0);
    }

    let index = PartIndex::scan(xml_text);
    let mut edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();
    let mut replaced = 0usize;

    for (i, para) in index.paragraphs.iter().enumerate() {
        if para.self_closing {
            continue;
        }
        let own_text = index.paragraph_text(xml_text, i);
        if !own_text.contains(token) {
            continue;
        }
        let total = own_text.matches(token).count();

        let content = para.open_end..para.range.end;
        let mut own_ranges = xml::text_content_ranges(xml_text, content);
        if para.has_nested {
            let inner: Vec<std::ops::Range<usize>> = index
                .paragraphs
                .iter()
                .filter(|p| p.range.start > para.range.start && p.range.end <= para.range.end)
                .map(|p| p.range.clone())
                .collect();
            own_ranges.retain(|r| !inner.iter().any(|n| n.contains(&r.start)));
        }

        let mut element_edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();
        let mut run_local = 0usize;
        for range in &own_ranges {
            let text = xml::unescape_text(&xml_text[range.clone()]);
            let count = text.matches(token).count();
            if count > 0 {
                run_local += count;
                let replaced_text = text.replace(token, replacement);
                element_edits.push((range.clone(), xml::escape_text(&replaced_text)));
            }
        }

        if run_local == total {
            edits.extend(element_edits);
            replaced += run_local;
        } else if para.has_nested {
            // Rebuilding would drop the nested paragraphs, so only the
            // element-local occurrences are rewritten.
            tracing::warn!(
                token,
                skipped = total - run_local,
                "token spans runs in a paragraph hosting nested content"
            );
            edits.extend(element_edits);
            replaced += run_local;
        } else {
            let opening = &xml_text[para.range.start..para.open_end];
            let properties = PARAGRAPH_PROPERTIES
                .find(&xml_text[para.open_end..para.range.end])
                .map(|m| m.as_str())
                .unwrap_or("");
            let new_text = own_text.replace(token, replacement);
            let rebuilt = format!(
                "{opening}{properties}<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                xml::escape_text(&new_text)
            );
            edits.push((para.range.clone(), rebuilt));
            replaced += total;
        }
    }

    if edits.is_empty() {
        return (xml_text.to_string(), 0);
    }
    (xml::splice_all(xml_text, edits), replaced)
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

    #[test]
    fn rewrites_single_run_in_place() {
        let xml = body(
            "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r><w:r><w:t>{{market_name}} report</w:t></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{market_name}}", "Widgets");
        assert_eq!(n, 1);
        // The bold run keeps its formatting; only the text node changed.
        assert!(out.contains("<w:rPr><w:b/></w:rPr><w:t>bold</w:t>"));
        assert!(out.contains("<w:t>Widgets report</w:t>"));
    }

    #[test]
    fn spanning_token_collapses_paragraph_to_one_run() {
        let xml = body(
            "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr><w:r><w:t>{{market_</w:t></w:r><w:r><w:t>name}} overview</w:t></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{market_name}}", "Gadgets");
        assert_eq!(n, 1);
        assert_eq!(
            out,
            body(
                "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr><w:r><w:t xml:space=\"preserve\">Gadgets overview</w:t></w:r></w:p>"
            )
        );
    }

    #[test]
    fn replacement_text_is_escaped() {
        let xml = body("<w:p><w:r><w:t>{{Company1}}</w:t></w:r></w:p>");
        let (out, n) = replace_in_part(&xml, "{{Company1}}", "Smith & Sons <Ltd>");
        assert_eq!(n, 1);
        assert!(out.contains("<w:t>Smith &amp; Sons &lt;Ltd&gt;</w:t>"));
    }

    #[test]
    fn replaces_inside_text_boxes() {
        let xml = body(
            "<w:p><w:r><w:t>host</w:t></w:r><w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>{{Segment1}}</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{Segment1}}", "Retail");
        assert_eq!(n, 1);
        assert!(out.contains("<w:t>Retail</w:t>"));
        assert!(out.contains("<w:t>host</w:t>"));
    }

    #[test]
    fn spanning_token_in_host_of_text_box_is_left_alone() {
        let xml = body(
            "<w:p><w:r><w:t>{{Seg</w:t></w:r><w:r><w:t>ment1}}</w:t></w:r><w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{Segment1}}", "Retail");
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let xml = body("<w:p><w:r><w:t>plain text</w:t></w:r></w:p>");
        let (out, n) = replace_in_part(&xml, "{{Segment1}}", "Retail");
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn empty_token_is_a_no_op() {
        let xml = body("<w:p><w:r><w:t>text</w:t></w:r></w:p>");
        let (out, n) = replace_in_part(&xml, "", "x");
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn replaces_every_occurrence_across_paragraphs() {
        let xml = body(
            "<w:p><w:r><w:t>{{Company1}} and {{Company1}}</w:t></w:r></w:p><w:p><w:r><w:t>{{Company1}}</w:t></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{Company1}}", "Acme");
        assert_eq!(n, 3);
        assert!(!out.contains("{{Company1}}"));
        assert_eq!(out.matches("Acme").count(), 3);
    }

    #[test]
    fn tokens_split_over_escaped_text_still_match() {
        // The own text is assembled from unescaped fragments, so
        // entities inside the token's surroundings do not break it.
        let xml = body(
            "<w:p><w:r><w:t>A &amp; B {{mar</w:t></w:r><w:r><w:t>ket_name}}</w:t></w:r></w:p>",
        );
        let (out, n) = replace_in_part(&xml, "{{market_name}}", "C");
        assert_eq!(n, 1);
        assert!(out.contains("A &amp; B C"));
    }
}
