//! Document facade
//!
//! Owns the opened package plus the decoded XML of the parts the
//! pipeline edits: the main body and every header. Substitution covers
//! body and headers; structural passes (placeholder cleanup, zone
//! removal, marker stripping, field refresh) apply to the body only,
//! headers keep their layout.

use std::collections::{BTreeSet, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::cleanup::{self, CleanupStats};
use crate::error::EngineError;
use crate::fields;
use crate::package::{DocxPackage, DOCUMENT_PART};
use crate::scan::PartIndex;
use crate::sections;
use crate::substitute::replace_in_part;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{[A-Za-z0-9_][A-Za-z0-9_ -]*\}\}").expect("invalid regex");
}

#[derive(Debug)]
struct HeaderPart {
    name: String,
    xml: String,
}

/// An open document ready for the generation passes.
#[derive(Debug)]
pub struct Document {
    package: DocxPackage,
    body: String,
    headers: Vec<HeaderPart>,
}

impl Document {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        let package = DocxPackage::from_bytes(bytes)?;
        let body = package.part_string(DOCUMENT_PART)?;
        let mut headers = Vec::new();
        for name in package.header_part_names() {
            let xml = package.part_string(&name)?;
            headers.push(HeaderPart { name, xml });
        }
        Ok(Self {
            package,
            body,
            headers,
        })
    }

    /// Replace a token across the body and all headers. A token that
    /// matches nowhere is logged; the caller decides whether that is a
    /// problem.
    pub fn replace_text(&mut self, token: &str, replacement: &str) -> usize {
        let (body, mut replaced) = replace_in_part(&self.body, token, replacement);
        self.body = body;
        for header in &mut self.headers {
            let (xml, n) = replace_in_part(&header.xml, token, replacement);
            header.xml = xml;
            replaced += n;
        }
        if replaced == 0 {
            tracing::warn!(token, "token not found anywhere in the document");
        }
        replaced
    }

    /// Drop body paragraphs and table rows still holding any of the
    /// given placeholders.
    pub fn remove_unfilled_placeholders(&mut self, placeholders: &[String]) -> CleanupStats {
        let (body, stats) = cleanup::remove_unfilled(&self.body, placeholders);
        self.body = body;
        stats
    }

    /// Remove the zones of segment slots not listed in `present`.
    pub fn remove_unused_zones(&mut self, present: &HashSet<usize>) -> usize {
        let (body, removed) = sections::remove_unused_zones(&self.body, present);
        self.body = body;
        removed
    }

    /// Strip the zone markers that survived zone removal.
    pub fn strip_zone_markers(&mut self) -> usize {
        let (body, handled) = sections::strip_zone_markers(&self.body);
        self.body = body;
        handled
    }

    /// Flag reference fields for recalculation on next open.
    pub fn refresh_reference_fields(&mut self) -> usize {
        let (body, flagged) = fields::mark_reference_fields_dirty(&self.body);
        self.body = body;
        flagged
    }

    /// Every `{{...}}` token present in body or header paragraph text,
    /// deduplicated and sorted. Tokens split across runs are still
    /// found because matching runs over assembled paragraph text.
    pub fn list_placeholders(&self) -> Vec<String> {
        let mut found = BTreeSet::new();
        collect_placeholders(&self.body, &mut found);
        for header in &self.headers {
            collect_placeholders(&header.xml, &mut found);
        }
        found.into_iter().collect()
    }

    /// The body part XML as it currently stands.
    pub fn body_xml(&self) -> &str {
        &self.body
    }

    /// Write the edited parts back and serialize the package.
    pub fn save_to_bytes(mut self) -> Result<Vec<u8>, EngineError> {
        self.package
            .set_part(DOCUMENT_PART, self.body.into_bytes());
        for header in self.headers {
            self.package.set_part(&header.name, header.xml.into_bytes());
        }
        self.package.to_bytes()
    }
}

fn collect_placeholders(xml: &str, found: &mut BTreeSet<String>) {
    let index = PartIndex::scan(xml);
    for i in 0..index.paragraphs.len() {
        let text = index.paragraph_text(xml, i);
        for m in PLACEHOLDER.find_iter(&text) {
            found.insert(m.as_str().to_string());
        }
    }
}
