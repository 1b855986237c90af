//! Document hook
//!
//! The host build calls [`DocumentHook::apply`] once per source document,
//! after the document's text is loaded and before output is produced. The
//! version anchor hook classifies the document by name, scans changelog-like
//! documents for version headings, and registers one anchor per heading.

use crate::anchors::classify::is_changelog_file;
use crate::anchors::heading::{scan_headings, HeadingMatch};
use crate::anchors::registry::{AnchorRecord, AnchorTable};
use crate::core::config::AnchorConfig;

/// A source document handed to hooks by the host build
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    /// Root-relative path without extension
    pub docname: &'a str,

    /// Root-relative path of the file
    pub path: &'a str,

    /// Full document text
    pub source: &'a str,
}

/// An anchor identifier registered twice within one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub anchor_id: String,
    /// Line of the registration that was overwritten
    pub first_line: u32,
    /// Line of the registration that won
    pub line: u32,
}

/// What a hook did to one document
#[derive(Debug, Clone, Default)]
pub struct HookOutcome {
    /// Whether the document was scanned at all
    pub changelog: bool,
    pub matches: Vec<HeadingMatch>,
    pub duplicates: Vec<Duplicate>,
}

/// A per-document processing step run by the host build
pub trait DocumentHook {
    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    /// Process one document, registering anchors in `table`
    fn apply(&self, doc: &Document<'_>, table: &mut dyn AnchorTable) -> HookOutcome;
}

/// Registers an anchor for every version heading of changelog-like documents
#[derive(Debug, Clone)]
pub struct VersionAnchorHook {
    config: AnchorConfig,
}

impl VersionAnchorHook {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    pub fn is_changelog(&self, docname: &str) -> bool {
        is_changelog_file(docname, self.config.markers())
    }

    fn record(doc: &Document<'_>, found: &HeadingMatch, alias_of: Option<String>) -> AnchorRecord {
        AnchorRecord {
            docname: doc.docname.to_string(),
            path: doc.path.to_string(),
            anchor_id: found.anchor_id.clone(),
            title: found.title.clone(),
            version: found.version.clone(),
            line: found.line,
            alias_of,
        }
    }
}

impl DocumentHook for VersionAnchorHook {
    fn name(&self) -> &str {
        "version-anchors"
    }

    fn apply(&self, doc: &Document<'_>, table: &mut dyn AnchorTable) -> HookOutcome {
        let mut outcome = HookOutcome::default();

        if !self.is_changelog(doc.docname) {
            tracing::trace!(docname = doc.docname, "Not a changelog document, skipping");
            return outcome;
        }
        outcome.changelog = true;

        for found in scan_headings(doc.source, &self.config) {
            let previous = table.register(
                found.anchor_id.clone(),
                Self::record(doc, &found, None),
            );

            if let Some(previous) = previous {
                tracing::debug!(
                    docname = doc.docname,
                    anchor = %found.anchor_id,
                    line = found.line,
                    previous_docname = %previous.docname,
                    previous_line = previous.line,
                    "Anchor registered again, last registration wins"
                );
                if previous.docname == doc.docname && previous.alias_of.is_none() {
                    outcome.duplicates.push(Duplicate {
                        anchor_id: found.anchor_id.clone(),
                        first_line: previous.line,
                        line: found.line,
                    });
                }
            }

            if self.config.alias() && found.version != found.anchor_id {
                table.register(
                    found.version.clone(),
                    Self::record(doc, &found, Some(found.anchor_id.clone())),
                );
            }

            tracing::debug!(
                docname = doc.docname,
                anchor = %found.anchor_id,
                line = found.line,
                "Registered version anchor"
            );
            outcome.matches.push(found);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::registry::LabelTable;
    use crate::core::config::RawConfig;

    fn hook() -> VersionAnchorHook {
        VersionAnchorHook::new(RawConfig::default().validate().unwrap())
    }

    fn doc<'a>(docname: &'a str, source: &'a str) -> Document<'a> {
        Document {
            docname,
            path: docname,
            source,
        }
    }

    #[test]
    fn test_registers_anchor_and_alias() {
        let mut table = LabelTable::new();
        let outcome = hook().apply(&doc("CHANGELOG", "25.5.0 (2025-05-21)\n"), &mut table);

        assert!(outcome.changelog);
        assert_eq!(outcome.matches.len(), 1);

        let primary = table.get("version-25.5.0").unwrap();
        assert_eq!(primary.line, 1);
        assert!(primary.alias_of.is_none());

        let alias = table.get("25.5.0").unwrap();
        assert_eq!(alias.alias_of.as_deref(), Some("version-25.5.0"));
        assert_eq!(alias.line, primary.line);
    }

    #[test]
    fn test_no_alias_when_disabled() {
        let config = RawConfig {
            version_anchor_alias: false,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let mut table = LabelTable::new();
        VersionAnchorHook::new(config).apply(&doc("NEWS", "1.0 (x)\n"), &mut table);

        assert!(table.contains("version-1.0"));
        assert!(!table.contains("1.0"));
    }

    #[test]
    fn test_no_alias_when_identical_to_anchor() {
        let config = RawConfig {
            version_anchor_format: "{version}".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let mut table = LabelTable::new();
        VersionAnchorHook::new(config).apply(&doc("NEWS", "1.0 (x)\n"), &mut table);

        assert_eq!(table.len(), 1);
        assert!(table.get("1.0").unwrap().alias_of.is_none());
    }

    #[test]
    fn test_non_changelog_untouched() {
        let mut table = LabelTable::new();
        let outcome = hook().apply(&doc("CHANGES", "25.5.0 (2025-05-21)\n"), &mut table);

        assert!(!outcome.changelog);
        assert!(outcome.matches.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_history_document_scanned() {
        let mut table = LabelTable::new();
        let outcome = hook().apply(&doc("HISTORY", "1.0 (x)\n"), &mut table);
        assert!(outcome.changelog);
        assert!(table.contains("version-1.0"));
    }

    #[test]
    fn test_duplicate_heading_last_wins() {
        let mut table = LabelTable::new();
        let outcome = hook().apply(
            &doc("CHANGELOG", "1.0 (first)\n\n1.0 (again)\n"),
            &mut table,
        );

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(
            outcome.duplicates,
            vec![Duplicate {
                anchor_id: "version-1.0".to_string(),
                first_line: 1,
                line: 3,
            }]
        );
        assert_eq!(table.get("version-1.0").unwrap().title, "1.0 (again)");
    }

    #[test]
    fn test_same_version_in_other_document_not_a_duplicate() {
        let mut table = LabelTable::new();
        let hook = hook();
        hook.apply(&doc("CHANGELOG", "1.0 (x)\n"), &mut table);
        let outcome = hook.apply(&doc("release-notes", "1.0 (y)\n"), &mut table);

        assert!(outcome.duplicates.is_empty());
        assert_eq!(table.get("version-1.0").unwrap().docname, "release-notes");
    }

    #[test]
    fn test_hook_name() {
        assert_eq!(hook().name(), "version-anchors");
    }
}
