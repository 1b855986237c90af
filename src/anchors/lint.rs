//! Anchor linting module
//!
//! Checks for:
//! - Version headings repeated within one document (last one wins)
//! - Changelog-like documents without any version heading
//! - Version references that resolve to no registered anchor
//! - Documents that could not be read

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::anchors::api::{build, BuildReport};
use crate::core::config::AnchorConfig;
use crate::core::model::{Confidence, RangeLine, ResultItem, ResultSet, VanchorError};
use crate::core::render::{RenderConfig, Renderer};

/// Lint issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    Error,
    Warning,
}

/// A lint issue
#[derive(Debug, Clone)]
pub struct LintIssue {
    pub severity: LintSeverity,
    pub code: String,
    pub message: String,
    pub path: String,
    pub line: Option<u32>,
}

impl LintIssue {
    pub fn error(code: &str, message: &str, path: &str, line: Option<u32>) -> Self {
        Self {
            severity: LintSeverity::Error,
            code: code.to_string(),
            message: message.to_string(),
            path: path.to_string(),
            line,
        }
    }

    pub fn warning(code: &str, message: &str, path: &str, line: Option<u32>) -> Self {
        Self {
            severity: LintSeverity::Warning,
            code: code.to_string(),
            message: message.to_string(),
            path: path.to_string(),
            line,
        }
    }

    pub fn to_result_item(&self) -> ResultItem {
        let mut item = ResultItem::error(VanchorError::new(&self.code, &self.message))
            .with_excerpt(self.message.clone())
            .with_confidence(match self.severity {
                LintSeverity::Error => Confidence::High,
                LintSeverity::Warning => Confidence::Medium,
            });
        item.path = Some(self.path.clone());
        item.range = self.line.map(RangeLine::line);
        item
    }
}

/// Collect issues from a finished build
pub fn lint_report(report: &BuildReport) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for doc in &report.documents {
        let path = doc.entry.path.as_str();

        if let Some(warning) = &doc.warning {
            issues.push(LintIssue::warning(
                warning.code.as_str(),
                &warning.message,
                path,
                None,
            ));
        }

        for dup in &doc.outcome.duplicates {
            issues.push(LintIssue::warning(
                "DUPLICATE_VERSION",
                &format!(
                    "Anchor '{}' at line {} overrides the heading at line {}",
                    dup.anchor_id, dup.line, dup.first_line
                ),
                path,
                Some(dup.line),
            ));
        }

        if doc.outcome.changelog && doc.outcome.matches.is_empty() {
            issues.push(LintIssue::warning(
                "NO_VERSION_HEADINGS",
                &format!(
                    "Changelog document '{}' has no heading matching the version pattern",
                    doc.entry.docname
                ),
                path,
                None,
            ));
        }

        for occurrence in &doc.refs {
            let reference = &occurrence.reference;
            if !report.table.contains(&reference.anchor_id) {
                issues.push(LintIssue::error(
                    "BROKEN_VERSION_REF",
                    &format!(
                        "Reference to version '{}' has no anchor '{}'",
                        reference.version, reference.anchor_id
                    ),
                    path,
                    Some(occurrence.line),
                ));
            }
        }
    }

    issues
}

/// Build and lint the tree under `root`
pub fn lint_anchors(root: &Path, config: &AnchorConfig) -> Result<Vec<LintIssue>> {
    Ok(lint_report(&build(root, config)?))
}

/// Run `lint`.
///
/// With `strict`, any error-severity issue fails the command.
pub fn run_lint(
    root: &Path,
    config: &AnchorConfig,
    strict: bool,
    quiet: bool,
    render_config: RenderConfig,
) -> Result<()> {
    let issues = lint_anchors(root, config)?;

    let mut result_set: ResultSet = issues.iter().map(LintIssue::to_result_item).collect();
    result_set.sort();
    Renderer::new(render_config).print(&result_set);

    let errors = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .count();
    let warnings = issues.len() - errors;

    if !quiet {
        let summary = format!("{} error(s), {} warning(s)", errors, warnings);
        if errors > 0 {
            eprintln!("✗ {}", summary.red());
        } else if warnings > 0 {
            eprintln!("! {}", summary.yellow());
        } else {
            eprintln!("✓ {}", "no issues".green());
        }
    }

    if strict && errors > 0 {
        bail!("lint found {} error(s)", errors);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RawConfig;
    use std::fs;
    use tempfile::tempdir;

    fn codes(issues: &[LintIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    fn lint(files: &[(&str, &str)]) -> Vec<LintIssue> {
        let temp = tempdir().unwrap();
        for (path, content) in files {
            fs::write(temp.path().join(path), content).unwrap();
        }
        lint_anchors(temp.path(), &RawConfig::default().validate().unwrap()).unwrap()
    }

    #[test]
    fn test_clean_tree() {
        let issues = lint(&[
            ("CHANGELOG.md", "## 1.0 (a)\n"),
            ("index.md", "See :version:`1.0`.\n"),
        ]);
        assert!(issues.is_empty(), "unexpected issues: {:?}", codes(&issues));
    }

    #[test]
    fn test_duplicate_version() {
        let issues = lint(&[("CHANGELOG.md", "1.0 (a)\n\n1.0 (b)\n")]);
        assert_eq!(codes(&issues), vec!["DUPLICATE_VERSION"]);
        assert_eq!(issues[0].line, Some(3));
        assert_eq!(issues[0].severity, LintSeverity::Warning);
    }

    #[test]
    fn test_changelog_without_headings() {
        let issues = lint(&[("NEWS.md", "# News\n\nNothing yet.\n")]);
        assert_eq!(codes(&issues), vec!["NO_VERSION_HEADINGS"]);
    }

    #[test]
    fn test_broken_reference() {
        let issues = lint(&[
            ("CHANGELOG.md", "1.0 (a)\n"),
            ("index.md", "Intro\n\nSee :version:`2.0`.\n"),
        ]);
        assert_eq!(codes(&issues), vec!["BROKEN_VERSION_REF"]);
        assert_eq!(issues[0].path, "index.md");
        assert_eq!(issues[0].line, Some(3));
        assert_eq!(issues[0].severity, LintSeverity::Error);
    }

    #[test]
    fn test_references_in_code_are_not_broken() {
        let issues = lint(&[
            ("CHANGELOG.md", "## 1.0 (a)\n"),
            (
                "guide.md",
                "# Guide\n\n```rst\n:version:`25.5.0`\n```\n\nUse `` :version:`9.9` `` inline.\n",
            ),
        ]);
        assert!(issues.is_empty(), "unexpected issues: {:?}", codes(&issues));
    }

    #[test]
    fn test_issue_to_result_item() {
        let item = LintIssue::error("BROKEN_VERSION_REF", "missing", "index.md", Some(4))
            .to_result_item();
        assert_eq!(item.errors[0].code, "BROKEN_VERSION_REF");
        assert_eq!(item.range, Some(RangeLine::line(4)));
        assert_eq!(item.confidence, Confidence::High);
    }
}
