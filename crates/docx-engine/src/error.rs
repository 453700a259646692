//! Error types for DOCX loading and serialization

use thiserror::Error;

/// Engine-side errors
///
/// Substitution and cleanup are infallible once a document is loaded;
/// errors only arise from the package container itself.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not a valid DOCX package: {0}")]
    InvalidPackage(#[from] zip::result::ZipError),

    #[error("package part not found: {0}")]
    MissingPart(String),

    #[error("package part {0} is not valid UTF-8")]
    InvalidText(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
