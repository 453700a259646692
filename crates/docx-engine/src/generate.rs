//! Generation pipeline
//!
//! Runs the full pass sequence over a template: market name, segment
//! and sub-segment names, the fixed block of ten company slots, then
//! unfilled-placeholder cleanup, zone removal for absent segments,
//! marker stripping, and a reference-field refresh before the package
//! is serialized.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::EngineError;
use crate::grammar::{self, MAX_COMPANIES, MAX_SEGMENTS, MAX_SUB_SEGMENTS};

/// One market segment with its sub-segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segmentation {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "subSegments")]
    pub sub_segments: Vec<String>,
}

/// Everything the pipeline substitutes into a template.
#[derive(Debug, Clone, Default)]
pub struct GenerationInput {
    pub market_name: String,
    pub segmentations: Vec<Segmentation>,
    /// Company names for the ten fixed slots; missing entries become
    /// empty strings.
    pub companies: Vec<String>,
}

/// What the pipeline did, for logging and auditing.
#[derive(Debug, Default, Serialize)]
pub struct GenerationSummary {
    pub replacements: usize,
    pub paragraphs_removed: usize,
    pub rows_removed: usize,
    pub zones_removed: usize,
    pub fields_refreshed: usize,
    pub warnings: Vec<String>,
}

pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub summary: GenerationSummary,
}

/// Fill a template with the given input and serialize the result.
pub fn generate(
    template: &[u8],
    input: &GenerationInput,
) -> Result<GeneratedDocument, EngineError> {
    let mut doc = Document::from_bytes(template)?;
    tracing::debug!(placeholders = ?doc.list_placeholders(), "opened template");

    let mut summary = GenerationSummary::default();
    let mut filled: HashSet<String> = HashSet::new();

    let mut substitute = |doc: &mut Document, token: String, value: &str| {
        let replaced = doc.replace_text(&token, value);
        if replaced == 0 {
            summary
                .warnings
                .push(format!("token {token} was not found in the template"));
        }
        summary.replacements += replaced;
        token
    };

    // Market name first, unconditionally.
    substitute(
        &mut doc,
        grammar::MARKET_NAME_TOKEN.to_string(),
        &input.market_name,
    );

    // Segment and sub-segment names for the slots the request provides.
    for (i, segment) in input
        .segmentations
        .iter()
        .take(MAX_SEGMENTS)
        .enumerate()
    {
        let slot = i + 1;
        let token = substitute(&mut doc, grammar::segment_token(slot), &segment.name);
        filled.insert(token);
        for (j, sub) in segment
            .sub_segments
            .iter()
            .take(MAX_SUB_SEGMENTS)
            .enumerate()
        {
            let token = substitute(&mut doc, grammar::sub_segment_token(slot, j + 1), sub);
            filled.insert(token);
        }
    }

    // All ten company slots, absent ones as empty strings.
    for k in 1..=MAX_COMPANIES {
        let value = input
            .companies
            .get(k - 1)
            .map(String::as_str)
            .unwrap_or("");
        substitute(&mut doc, grammar::company_token(k), value);
    }

    // Whatever segment-grammar tokens were never filled come out now,
    // paragraph or table row at a time.
    let stats = doc.remove_unfilled_placeholders(&grammar::cleanup_placeholders(&filled));
    summary.paragraphs_removed = stats.paragraphs_removed;
    summary.rows_removed = stats.rows_removed;

    let present: HashSet<usize> = input
        .segmentations
        .iter()
        .take(MAX_SEGMENTS)
        .enumerate()
        .filter(|(_, s)| !s.name.trim().is_empty())
        .map(|(i, _)| i + 1)
        .collect();
    summary.zones_removed = doc.remove_unused_zones(&present);
    doc.strip_zone_markers();
    summary.fields_refreshed = doc.refresh_reference_fields();

    tracing::info!(
        replacements = summary.replacements,
        paragraphs_removed = summary.paragraphs_removed,
        rows_removed = summary.rows_removed,
        zones_removed = summary.zones_removed,
        fields_refreshed = summary.fields_refreshed,
        warnings = summary.warnings.len(),
        "document generated"
    );

    let bytes = doc.save_to_bytes()?;
    Ok(GeneratedDocument { bytes, summary })
}
