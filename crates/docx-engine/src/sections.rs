//! Segment zone removal
//!
//! Templates bracket optional per-segment regions with marker
//! paragraphs: `{{Segment<i>_Start}}` opens a zone, `{{Segment<i>_End}}`
//! closes it. When a segment slot is not present in the request, every
//! zone for that slot is removed, marker paragraphs included, along
//! with any tables sitting between them. Markers of present segments
//! stay through substitution and are stripped at the end.

use std::collections::HashSet;
use std::ops::Range;

use crate::grammar::{self, MAX_SEGMENTS};
use crate::scan::{Container, PartIndex};
use crate::substitute::replace_in_part;
use crate::xml;

/// Remove all zones of the segment slots not in `present` (1-based
/// indexes). Returns the new XML and the number of zones removed.
pub fn remove_unused_zones(xml_text: &str, present: &HashSet<usize>) -> (String, usize) {
    let index = PartIndex::scan(xml_text);
    let body_paragraphs: Vec<(Range<usize>, String)> = index
        .paragraphs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.container == Container::Body)
        .map(|(i, p)| (p.range.clone(), index.paragraph_text(xml_text, i)))
        .collect();

    let mut zones: Vec<Range<usize>> = Vec::new();
    for i in 1..=MAX_SEGMENTS {
        if present.contains(&i) {
            continue;
        }
        let start_marker = grammar::zone_start_marker(i);
        let end_marker = grammar::zone_end_marker(i);
        let mut open: Option<usize> = None;
        for (range, text) in &body_paragraphs {
            if open.is_none() && text.contains(&start_marker) {
                open = Some(range.start);
            }
            if let Some(start) = open {
                if text.contains(&end_marker) {
                    zones.push(start..range.end);
                    open = None;
                }
            }
        }
        if open.is_some() {
            tracing::warn!(segment = i, "zone start marker without a matching end");
        }
    }

    if zones.is_empty() {
        return (xml_text.to_string(), 0);
    }

    // Zones of different segments may interleave; merge before splicing
    // and count the regions actually spliced out.
    zones.sort_by_key(|z| z.start);
    let mut merged: Vec<Range<usize>> = Vec::new();
    for zone in zones {
        match merged.last_mut() {
            Some(last) if zone.start <= last.end => {
                last.end = last.end.max(zone.end);
            }
            _ => merged.push(zone),
        }
    }
    let removed = merged.len();

    let edits = merged.into_iter().map(|r| (r, String::new())).collect();
    (xml::splice_all(xml_text, edits), removed)
}

/// Strip every zone marker that survived zone removal: body paragraphs
/// holding a marker are dropped, markers elsewhere (table cells, text
/// boxes) are erased from the text. Returns the new XML and the number
/// of markers handled.
pub fn strip_zone_markers(xml_text: &str) -> (String, usize) {
    let markers = grammar::zone_markers();

    let index = PartIndex::scan(xml_text);
    let mut removals: Vec<Range<usize>> = Vec::new();
    let mut handled = 0usize;
    for (i, para) in index.paragraphs.iter().enumerate() {
        if para.container != Container::Body {
            continue;
        }
        let text = index.paragraph_text(xml_text, i);
        let hits: usize = markers.iter().map(|m| text.matches(m.as_str()).count()).sum();
        if hits > 0 {
            removals.push(para.range.clone());
            handled += hits;
        }
    }
    let mut out = if removals.is_empty() {
        xml_text.to_string()
    } else {
        let edits = removals.into_iter().map(|r| (r, String::new())).collect();
        xml::splice_all(xml_text, edits)
    };

    for marker in &markers {
        let (next, erased) = replace_in_part(&out, marker, "");
        out = next;
        handled += erased;
    }
    (out, handled)
}
