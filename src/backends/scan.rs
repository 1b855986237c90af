//! Documentation tree scanning
//!
//! Uses the ignore crate for traversal, so `.gitignore` rules and hidden
//! files are honoured the same way a docs build would skip them.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::paths::{docname, make_relative};

/// Extensions treated as documentation sources
pub const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "qmd"];

/// A documentation source file found under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// Absolute path
    pub full_path: PathBuf,

    /// Root-relative path using '/'
    pub path: String,

    /// Root-relative path without extension
    pub docname: String,
}

/// Check if a file is a documentation source (known extension or none)
pub fn is_document_candidate(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => DOC_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => true,
    }
}

/// Collect documentation sources under `root`, sorted by path
pub fn scan_documents(root: &Path) -> Result<Vec<DocumentEntry>> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        // honour .gitignore even outside a git checkout
        .require_git(false);

    let mut documents = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if !is_document_candidate(path) {
            continue;
        }

        let Some(relative) = make_relative(path, root) else {
            continue;
        };

        documents.push(DocumentEntry {
            full_path: path.to_path_buf(),
            docname: docname(&relative),
            path: relative,
        });
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = documents.len(), root = %root.display(), "Scanned documents");
    Ok(documents)
}
