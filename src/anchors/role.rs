//! Version references
//!
//! Documents link to a version section with an inline reference:
//! `` :version:`25.5.0` `` resolves to the anchor identifier rendered from the
//! configured template and to the fragment URI `#version-25.5.0`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::anchors::literal::{code_spans, in_code_span, FenceTracker};
use crate::core::config::AnchorConfig;

/// Static regex for inline version references
/// Format: :version:`25.5.0`
pub static ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":version:`([^`]*)`").expect("Invalid ROLE_RE regex"));

/// A resolved version reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    /// Display text (the trimmed version)
    pub version: String,

    /// Anchor identifier the reference points to
    pub anchor_id: String,

    /// Fragment URI
    pub uri: String,
}

/// A version reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOccurrence {
    /// 1-indexed line
    pub line: u32,
    pub reference: VersionRef,
}

/// Build the reference for `version`
pub fn version_ref(version: &str, config: &AnchorConfig) -> VersionRef {
    let version = version.trim();
    let anchor_id = config.template().render(version);
    VersionRef {
        version: version.to_string(),
        uri: format!("#{anchor_id}"),
        anchor_id,
    }
}

/// Find every version reference in `content`.
///
/// References inside fenced code blocks or inline code spans are literal
/// text and are not reported.
pub fn find_version_refs(content: &str, config: &AnchorConfig) -> Vec<RoleOccurrence> {
    let mut fences = FenceTracker::new();
    let mut found = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if fences.is_literal(line) {
            continue;
        }
        let spans = code_spans(line);

        for caps in ROLE_RE.captures_iter(line) {
            let (Some(whole), Some(text)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if text.as_str().trim().is_empty() || in_code_span(&spans, whole.start()) {
                continue;
            }
            found.push(RoleOccurrence {
                line: idx as u32 + 1,
                reference: version_ref(text.as_str(), config),
            });
        }
    }

    found
}
