//! DOCX package access
//!
//! A `.docx` file is a ZIP archive of XML parts plus media. The package
//! keeps every entry in archive order as raw bytes and only the parts
//! the pipeline edits are ever decoded, so untouched entries survive a
//! load/save cycle byte for byte.

use std::io::{Cursor, Read, Write};

use lazy_static::lazy_static;
use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::EngineError;

/// Main document part name.
pub const DOCUMENT_PART: &str = "word/document.xml";

lazy_static! {
    static ref HEADER_PART: Regex =
        Regex::new(r"^word/header\d+\.xml$").expect("invalid regex");
}

/// An opened package: ordered `(name, bytes)` entries.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Read every archive entry into memory, preserving order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push((file.name().to_string(), data));
        }
        Ok(Self { entries })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Decode a part as UTF-8 text.
    pub fn part_string(&self, name: &str) -> Result<String, EngineError> {
        let data = self
            .part(name)
            .ok_or_else(|| EngineError::MissingPart(name.to_string()))?;
        String::from_utf8(data.to_vec()).map_err(|_| EngineError::InvalidText(name.to_string()))
    }

    /// Replace a part's bytes, or append the part if it does not exist.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((name.to_string(), data)),
        }
    }

    /// Names of all `word/headerN.xml` parts, in archive order.
    pub fn header_part_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| HEADER_PART.is_match(name))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Serialize back to a ZIP archive. Media entries are stored without
    /// compression, everything else deflated.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.entries {
            let method = if name.starts_with("word/media/") {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }
        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
