//! Zip packaging of a validated generation result.
//!
//! Paths come from untrusted model output, so every entry name is checked
//! before anything is written. The policy is to reject, never to rewrite:
//!
//! - empty paths, absolute paths (`/x`, `C:\x`, `C:/x`) and trailing `/`
//! - backslashes and NUL bytes
//! - `.`, `..` and empty path components
//! - the same path appearing twice
//!
//! Any violation fails the whole archive with [`GenerationError::Packaging`].

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::GenerationError;
use super::types::GenerationResult;

/// File name offered to clients downloading the archive.
pub const ARCHIVE_FILENAME: &str = "mcp-server.zip";

/// Media type of the produced archive.
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

const COMPRESSION_LEVEL: i64 = 6;

/// An in-memory zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
}

impl Archive {
    /// Exact byte length, suitable for a `Content-Length` header.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Check that a path can be used as an archive entry or a relative file path.
pub fn check_entry_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty path".to_string());
    }
    if path.contains('\0') {
        return Err(format!("path contains a NUL byte: {path:?}"));
    }
    if path.contains('\\') {
        return Err(format!("path contains a backslash: {path}"));
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(format!("absolute path: {path}"));
    }
    if path.ends_with('/') {
        return Err(format!("path names a directory: {path}"));
    }
    if path
        .split('/')
        .any(|component| component.is_empty() || component == "." || component == "..")
    {
        return Err(format!("path contains an invalid component: {path}"));
    }

    Ok(())
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn packaging_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::Packaging(e.to_string())
}

/// Package every generated file into a deflate-compressed zip archive.
///
/// Entries are written in input order. No directory entries are added.
pub fn package(result: &GenerationResult) -> Result<Archive, GenerationError> {
    let mut seen = HashSet::with_capacity(result.files.len());
    for file in &result.files {
        check_entry_path(&file.path).map_err(GenerationError::Packaging)?;
        if !seen.insert(file.path.as_str()) {
            return Err(GenerationError::Packaging(format!(
                "duplicate path: {}",
                file.path
            )));
        }
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in &result.files {
        writer
            .start_file(file.path.as_str(), options)
            .map_err(packaging_error)?;
        writer
            .write_all(file.content.as_bytes())
            .map_err(packaging_error)?;
    }

    let cursor = writer.finish().map_err(packaging_error)?;

    Ok(Archive {
        bytes: cursor.into_inner(),
    })
}
