//! Reference field refresh
//!
//! Removing paragraphs and rows invalidates tables of contents, page
//! references, and sequence numbering. Word only recalculates a field
//! when its begin `<w:fldChar>` carries `w:dirty="true"`, so every
//! paragraph whose field instruction names a reference function gets
//! its begin markers flagged.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::scan::PartIndex;
use crate::xml;

/// Field instruction keywords whose results depend on document layout.
const REFERENCE_KEYWORDS: [&str; 6] = ["TOC", "TOF", "TOT", "REF", "PAGEREF", "SEQ"];

lazy_static! {
    static ref INSTRUCTION_TEXT: Regex =
        Regex::new(r"<w:instrText(?:\s[^>]*?)?>([^<]*)</w:instrText>").expect("invalid regex");
    static ref FIELD_CHAR: Regex =
        Regex::new(r"<w:fldChar(?:\s[^>]*?)?/?>").expect("invalid regex");
}

/// Mark the begin field characters of reference fields dirty. Returns
/// the new XML and the number of fields flagged.
pub fn mark_reference_fields_dirty(xml_text: &str) -> (String, usize) {
    let index = PartIndex::scan(xml_text);
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut flagged = 0usize;

    for para in &index.paragraphs {
        if para.self_closing {
            continue;
        }
        let slices = own_slices(&index, para.range.clone(), para.open_end, para.has_nested);

        let instruction: String = slices
            .iter()
            .flat_map(|s| {
                INSTRUCTION_TEXT
                    .captures_iter(&xml_text[s.clone()])
                    .map(|c| xml::unescape_text(c.get(1).expect("capture group 1").as_str()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .join(" ");
        if instruction.is_empty()
            || !REFERENCE_KEYWORDS.iter().any(|k| instruction.contains(k))
        {
            continue;
        }

        for slice in &slices {
            for m in FIELD_CHAR.find_iter(&xml_text[slice.clone()]) {
                let tag = m.as_str();
                if !tag.contains("w:fldCharType=\"begin\"") || tag.contains("w:dirty") {
                    continue;
                }
                let insert_at = slice.start
                    + if tag.ends_with("/>") {
                        m.end() - 2
                    } else {
                        m.end() - 1
                    };
                edits.push((insert_at..insert_at, " w:dirty=\"true\"".to_string()));
                flagged += 1;
            }
        }
    }

    if edits.is_empty() {
        return (xml_text.to_string(), 0);
    }
    (xml::splice_all(xml_text, edits), flagged)
}

/// The paragraph's content range minus any nested paragraph ranges.
fn own_slices(
    index: &PartIndex,
    range: Range<usize>,
    open_end: usize,
    has_nested: bool,
) -> Vec<Range<usize>> {
    if !has_nested {
        return vec![open_end..range.end];
    }
    let mut inner: Vec<Range<usize>> = index
        .paragraphs
        .iter()
        .filter(|p| p.range.start > range.start && p.range.end <= range.end)
        .map(|p| p.range.clone())
        .collect();
    inner.sort_by_key(|r| r.start);

    let mut slices = Vec::new();
    let mut cursor = open_end;
    for nested in inner {
        if nested.start > cursor {
            slices.push(cursor..nested.start);
        }
        cursor = cursor.max(nested.end);
    }
    if cursor < range.end {
        slices.push(cursor..range.end);
    }
    slices
}
