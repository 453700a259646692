//! Word report generation engine
//!
//! Fills `.docx` templates for market research reports:
//!
//! - `{{...}}` token substitution across body and header parts, with
//!   tokens found even when Word has split them across runs
//! - removal of paragraphs and table rows whose placeholders were
//!   never filled
//! - removal of `{{Segment<i>_Start}}`/`{{Segment<i>_End}}` zones for
//!   segments the request does not provide
//! - a reference-field refresh so tables of contents recalculate on
//!   next open
//!
//! The package is edited as XML text: parts are scanned into byte-range
//! indexes and all edits to one part are spliced in a single batch.
//! Entries the pipeline never touches survive byte for byte.

pub mod cleanup;
pub mod document;
pub mod error;
pub mod fields;
pub mod generate;
pub mod grammar;
pub mod package;
pub mod scan;
pub mod sections;
pub mod substitute;
pub mod xml;

pub use cleanup::CleanupStats;
pub use document::Document;
pub use error::EngineError;
pub use generate::{
    generate, GeneratedDocument, GenerationInput, GenerationSummary, Segmentation,
};
pub use package::{DocxPackage, DOCUMENT_PART};
