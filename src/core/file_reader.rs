//! Document reading
//!
//! A document is either read whole or skipped; it is never truncated, so a
//! scanned changelog always sees all of its headings. Handles:
//! - Non-UTF-8 files (lossy conversion)
//! - Oversized files (skipped)
//! - Binary files (skipped)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default maximum document size in bytes (64 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Bytes inspected for NUL when detecting binary content
const BINARY_SNIFF_LEN: usize = 8192;

/// Warning codes for document reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    /// File was skipped due to size
    FileSkippedSize,
    /// Lossy encoding conversion used
    LossyConversion,
    /// File appears to be binary
    BinaryFile,
    /// File could not be read
    Unreadable,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileSkippedSize => "FILE_SKIPPED_SIZE",
            WarningCode::LossyConversion => "LOSSY_CONVERSION",
            WarningCode::BinaryFile => "BINARY_FILE",
            WarningCode::Unreadable => "UNREADABLE",
        }
    }
}

/// A structured warning about one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWarning {
    pub code: WarningCode,
    pub message: String,
    pub path: String,
}

impl FileWarning {
    pub fn new(code: WarningCode, message: impl Into<String>, path: &Path) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.display().to_string(),
        }
    }
}

/// Result of reading a document
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The document text, `None` if skipped
    pub content: Option<String>,

    /// File size in bytes, when known
    pub size: Option<u64>,

    /// Whether lossy conversion was used
    pub lossy: bool,

    /// Why the document was skipped or degraded
    pub warning: Option<FileWarning>,
}

impl FileReadResult {
    fn skipped(warning: FileWarning, size: Option<u64>) -> Self {
        Self {
            content: None,
            size,
            lossy: false,
            warning: Some(warning),
        }
    }
}

/// Read a document, skipping files larger than `max_size`
pub fn read_document_with_limit(path: &Path, max_size: u64) -> FileReadResult {
    let size = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) => {
            return FileReadResult::skipped(
                FileWarning::new(
                    WarningCode::Unreadable,
                    format!("Cannot read metadata: {}", e),
                    path,
                ),
                None,
            );
        }
    };

    if size > max_size {
        return FileReadResult::skipped(
            FileWarning::new(
                WarningCode::FileSkippedSize,
                format!("File exceeds size limit ({} > {} bytes)", size, max_size),
                path,
            ),
            Some(size),
        );
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            return FileReadResult::skipped(
                FileWarning::new(
                    WarningCode::Unreadable,
                    format!("Cannot read file: {}", e),
                    path,
                ),
                Some(size),
            );
        }
    };

    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return FileReadResult::skipped(
            FileWarning::new(
                WarningCode::BinaryFile,
                "File appears to be binary (contains null bytes)",
                path,
            ),
            Some(size),
        );
    }

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult {
            content: Some(content),
            size: Some(size),
            lossy: false,
            warning: None,
        },
        Err(err) => FileReadResult {
            content: Some(String::from_utf8_lossy(err.as_bytes()).into_owned()),
            size: Some(size),
            lossy: true,
            warning: Some(FileWarning::new(
                WarningCode::LossyConversion,
                "Lossy UTF-8 conversion applied (some characters replaced)",
                path,
            )),
        },
    }
}

/// Read a document with the default size limit
pub fn read_document(path: &Path) -> FileReadResult {
    read_document_with_limit(path, DEFAULT_MAX_FILE_SIZE)
}
