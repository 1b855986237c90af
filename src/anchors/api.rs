//! Anchor API - build, list, resolve, scan, classify, ref operations
//!
//! A build walks the documentation tree once, runs the version anchor hook
//! on every document in path order, and owns the resulting label table.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

use crate::anchors::github::{is_linked_document, rewrite_issue_links, Markup};
use crate::anchors::heading::{scan_headings, HeadingMatch};
use crate::anchors::hook::{Document, DocumentHook, HookOutcome, VersionAnchorHook};
use crate::anchors::registry::{AnchorRecord, LabelTable};
use crate::anchors::role::{find_version_refs, version_ref, RoleOccurrence};
use crate::backends::scan::{scan_documents, DocumentEntry};
use crate::core::config::{AnchorConfig, LinksConfig};
use crate::core::file_reader::{read_document, FileWarning};
use crate::core::model::{Confidence, Meta, RangeLine, ResultItem, ResultSet};
use crate::core::paths::{docname, make_relative, normalize_path};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::hash_bytes;

/// One document as seen by a build
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub entry: DocumentEntry,
    pub meta: Meta,
    pub outcome: HookOutcome,
    pub refs: Vec<RoleOccurrence>,
    pub warning: Option<FileWarning>,
}

/// Everything one build produced
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub table: LabelTable,
    pub documents: Vec<ProcessedDocument>,
}

impl BuildReport {
    fn meta_for(&self, path: &str) -> Meta {
        self.documents
            .iter()
            .find(|d| d.entry.path == path)
            .map(|d| d.meta.clone())
            .unwrap_or_default()
    }

    /// Result items for every registered label, aliases optional
    pub fn anchor_items(&self, include_aliases: bool) -> ResultSet {
        let metas: HashMap<&str, Meta> = self
            .documents
            .iter()
            .map(|d| (d.entry.path.as_str(), d.meta.clone()))
            .collect();

        let mut result_set: ResultSet = self
            .table
            .iter()
            .filter(|(_, record)| include_aliases || record.alias_of.is_none())
            .map(|(name, record)| {
                let meta = metas.get(record.path.as_str()).cloned().unwrap_or_default();
                record_item(name, record, meta)
            })
            .collect();

        // primary before alias on the same line
        result_set
            .items
            .sort_by_key(|item| item.confidence == Confidence::Medium);
        result_set.sort();
        result_set
    }
}

/// Result item for a label registered under `name`
fn record_item(name: &str, record: &AnchorRecord, meta: Meta) -> ResultItem {
    let mut data = json!({
        "id": name,
        "version": record.version,
        "docname": record.docname,
    });
    let confidence = match &record.alias_of {
        Some(target) => {
            data["alias_of"] = json!(target);
            Confidence::Medium
        }
        None => Confidence::High,
    };

    ResultItem::anchor(record.path.clone(), RangeLine::line(record.line))
        .with_excerpt(record.title.clone())
        .with_data(data)
        .with_confidence(confidence)
        .with_meta(meta)
}

/// Run the version anchor hook over every document under `root`
pub fn build(root: &Path, config: &AnchorConfig) -> Result<BuildReport> {
    let hook = VersionAnchorHook::new(config.clone());
    let mut table = LabelTable::new();
    let mut documents = Vec::new();

    for entry in scan_documents(root)? {
        let read = read_document(&entry.full_path);
        let mut meta = Meta {
            size: read.size,
            hash: None,
            lossy: read.lossy,
        };

        let Some(source) = read.content else {
            if let Some(warning) = &read.warning {
                tracing::warn!(
                    path = %warning.path,
                    code = warning.code.as_str(),
                    "{}",
                    warning.message
                );
            }
            documents.push(ProcessedDocument {
                entry,
                meta,
                outcome: HookOutcome::default(),
                refs: Vec::new(),
                warning: read.warning,
            });
            continue;
        };

        meta.hash = Some(hash_bytes(source.as_bytes()));
        let doc = Document {
            docname: &entry.docname,
            path: &entry.path,
            source: &source,
        };
        tracing::trace!(hook = hook.name(), docname = doc.docname, "Running hook");
        let outcome = hook.apply(&doc, &mut table);
        let refs = find_version_refs(&source, config);

        documents.push(ProcessedDocument {
            entry,
            meta,
            outcome,
            refs,
            warning: read.warning,
        });
    }

    if table.is_empty() {
        tracing::debug!(root = %root.display(), "No version anchors registered");
    }
    tracing::info!(
        documents = documents.len(),
        labels = table.len(),
        "Build finished"
    );
    Ok(BuildReport { table, documents })
}

/// List all registered anchors
pub fn list_anchors(root: &Path, config: &AnchorConfig, include_aliases: bool) -> Result<ResultSet> {
    Ok(build(root, config)?.anchor_items(include_aliases))
}

/// Resolve a label (anchor identifier or alias) to its location
pub fn resolve_anchor(root: &Path, config: &AnchorConfig, name: &str) -> Result<ResultSet> {
    let report = build(root, config)?;
    let Some(record) = report.table.get(name) else {
        bail!("No version anchor named '{}'", name);
    };
    tracing::debug!(name, anchor = %record.anchor_id, line = record.line, "Resolved label");

    let mut result_set = ResultSet::new();
    result_set.push(record_item(name, record, report.meta_for(&record.path)));
    Ok(result_set)
}

/// Scan a single document.
///
/// Non-changelog documents produce nothing unless `force` is set.
pub fn scan_document(
    root: &Path,
    file: &Path,
    config: &AnchorConfig,
    force: bool,
) -> Result<ResultSet> {
    let full_path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    let relative = document_path(&full_path, root);
    let name = docname(&relative);

    let read = read_document(&full_path);
    let source = match read.content {
        Some(source) => source,
        None => {
            let reason = read
                .warning
                .map(|w| w.message)
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("Cannot read {}: {}", full_path.display(), reason);
        }
    };

    let meta = Meta {
        size: read.size,
        hash: Some(hash_bytes(source.as_bytes())),
        lossy: read.lossy,
    };

    let matches: Vec<HeadingMatch> = if force {
        scan_headings(&source, config).collect()
    } else {
        let doc = Document {
            docname: &name,
            path: &relative,
            source: &source,
        };
        let mut table = LabelTable::new();
        VersionAnchorHook::new(config.clone())
            .apply(&doc, &mut table)
            .matches
    };

    Ok(matches
        .into_iter()
        .map(|found| {
            ResultItem::anchor(relative.clone(), RangeLine::line(found.line))
                .with_excerpt(found.raw)
                .with_data(json!({
                    "id": found.anchor_id,
                    "version": found.version,
                    "docname": name,
                }))
                .with_meta(meta.clone())
        })
        .collect())
}

/// Root-relative path of `full_path`, or its bare file name when it lies
/// outside `root`, so directories above the tree never affect classification
fn document_path(full_path: &Path, root: &Path) -> String {
    match make_relative(full_path, root) {
        Some(relative) if !relative.starts_with("../") => relative,
        _ => {
            let name = full_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| normalize_path(full_path));
            tracing::debug!(
                path = %full_path.display(),
                root = %root.display(),
                "Document outside root, classifying by file name"
            );
            name
        }
    }
}

/// Classify paths as changelog-like or not
pub fn classify_paths(paths: &[String], config: &AnchorConfig) -> ResultSet {
    let hook = VersionAnchorHook::new(config.clone());
    paths
        .iter()
        .map(|path| {
            let path = path.replace('\\', "/");
            let name = docname(&path);
            let changelog = hook.is_changelog(&name);
            ResultItem::file(path).with_data(json!({
                "docname": name,
                "changelog": changelog,
            }))
        })
        .collect()
}

/// Rewrite issue references in every changelog-like document under `root`
pub fn issue_links(root: &Path, config: &LinksConfig) -> Result<ResultSet> {
    let mut result_set = ResultSet::new();

    for entry in scan_documents(root)? {
        if !is_linked_document(&entry.docname, config) {
            continue;
        }

        let read = read_document(&entry.full_path);
        let Some(source) = read.content else {
            if let Some(warning) = &read.warning {
                tracing::warn!(
                    path = %warning.path,
                    code = warning.code.as_str(),
                    "{}",
                    warning.message
                );
            }
            continue;
        };
        let meta = Meta {
            size: read.size,
            hash: Some(hash_bytes(source.as_bytes())),
            lossy: read.lossy,
        };

        let markup = Markup::for_path(&entry.path);
        for linked in rewrite_issue_links(&source, markup, config) {
            tracing::debug!(
                path = %entry.path,
                line = linked.line,
                links = linked.links.len(),
                "Rewrote issue references"
            );
            let links: Vec<_> = linked
                .links
                .iter()
                .map(|link| {
                    let mut value = json!(link);
                    if config.new_tab() {
                        value["target"] = json!("_blank");
                        value["rel"] = json!("noopener");
                    }
                    value
                })
                .collect();

            result_set.push(
                ResultItem::link(entry.path.clone(), RangeLine::line(linked.line))
                    .with_excerpt(linked.rewritten)
                    .with_data(json!({
                        "original": linked.original,
                        "links": links,
                    }))
                    .with_meta(meta.clone()),
            );
        }
    }

    result_set.sort();
    Ok(result_set)
}

/// Render version references without scanning
pub fn version_refs(versions: &[String], config: &AnchorConfig) -> Result<ResultSet> {
    let mut result_set = ResultSet::new();
    for version in versions {
        if version.trim().is_empty() {
            bail!("Version must not be empty");
        }
        let reference = version_ref(version, config);
        result_set.push(ResultItem::reference(
            serde_json::to_value(&reference).context("Failed to serialize reference")?,
        ));
    }
    Ok(result_set)
}

/// Run `list`
pub fn run_list(
    root: &Path,
    config: &AnchorConfig,
    include_aliases: bool,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = list_anchors(root, config, include_aliases)?;
    if result_set.is_empty() {
        tracing::info!(root = %root.display(), "No version anchors found");
    } else {
        tracing::debug!(count = result_set.len(), include_aliases, "Listing anchors");
    }
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `resolve`
pub fn run_resolve(
    root: &Path,
    config: &AnchorConfig,
    name: &str,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = resolve_anchor(root, config, name)?;
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `scan`
pub fn run_scan(
    root: &Path,
    file: &Path,
    config: &AnchorConfig,
    force: bool,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = scan_document(root, file, config, force)?;
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `classify`
pub fn run_classify(
    paths: &[String],
    config: &AnchorConfig,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = classify_paths(paths, config);
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `ref`
pub fn run_ref(versions: &[String], config: &AnchorConfig, render_config: RenderConfig) -> Result<()> {
    let result_set = version_refs(versions, config)?;
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `links`
pub fn run_links(root: &Path, config: &LinksConfig, render_config: RenderConfig) -> Result<()> {
    let result_set = issue_links(root, config)?;
    tracing::debug!(lines = result_set.len(), repo = config.repo(), "Issue links rewritten");
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

/// Run `check`
pub fn run_check(config: &AnchorConfig, render_config: RenderConfig) -> Result<()> {
    let mut result_set = ResultSet::new();
    result_set.push(ResultItem::config(config.to_json()));
    Renderer::new(render_config).print(&result_set);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RawConfig;
    use std::fs;
    use tempfile::tempdir;

    fn default_config() -> AnchorConfig {
        RawConfig::default().validate().unwrap()
    }

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    fn ids(set: &ResultSet) -> Vec<String> {
        set.items
            .iter()
            .filter_map(|i| i.data.as_ref()?.get("id")?.as_str().map(String::from))
            .collect()
    }

    #[test]
    fn test_build_only_scans_changelogs() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGELOG.md", "## 2.0 (b)\n\n## 1.0 (a)\n");
        write(temp.path(), "CHANGES.rst", "3.0 (c)\n=======\n");
        write(temp.path(), "docs/index.md", "1.5 (x)\n");

        let report = build(temp.path(), &default_config()).unwrap();
        assert_eq!(report.documents.len(), 3);
        assert!(report.table.contains("version-2.0"));
        assert!(report.table.contains("version-1.0"));
        assert!(!report.table.contains("version-3.0"));
        assert!(!report.table.contains("version-1.5"));
    }

    #[test]
    fn test_anchor_items_sorted_with_optional_aliases() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGELOG.md", "## 2.0 (b)\n\n## 1.0 (a)\n");

        let report = build(temp.path(), &default_config()).unwrap();

        let primary = report.anchor_items(false);
        assert_eq!(ids(&primary), vec!["version-2.0", "version-1.0"]);
        assert!(primary.items[0].meta.hash.is_some());

        let all = report.anchor_items(true);
        assert_eq!(
            ids(&all),
            vec!["version-2.0", "2.0", "version-1.0", "1.0"]
        );
        assert_eq!(all.items[1].confidence, Confidence::Medium);
    }

    #[test]
    fn test_builds_are_repeatable() {
        let temp = tempdir().unwrap();
        write(temp.path(), "HISTORY.md", "1.0 (a)\n1.1 (b)\n");

        let first = ids(&list_anchors(temp.path(), &default_config(), true).unwrap());
        let second = ids(&list_anchors(temp.path(), &default_config(), true).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_anchor_and_alias() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGELOG.md", "intro\n\n25.5.0 (2025-05-21)\n");

        let by_id = resolve_anchor(temp.path(), &default_config(), "version-25.5.0").unwrap();
        let by_alias = resolve_anchor(temp.path(), &default_config(), "25.5.0").unwrap();

        assert_eq!(by_id.items[0].range, Some(RangeLine::line(3)));
        assert_eq!(by_alias.items[0].range, by_id.items[0].range);
        assert_eq!(by_alias.items[0].path.as_deref(), Some("CHANGELOG.md"));
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGELOG.md", "1.0 (a)\n");
        assert!(resolve_anchor(temp.path(), &default_config(), "version-9.9").is_err());
    }

    #[test]
    fn test_scan_document_respects_classification() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGES.rst", "1.0 (a)\n");

        let config = default_config();
        let skipped = scan_document(temp.path(), Path::new("CHANGES.rst"), &config, false).unwrap();
        assert!(skipped.is_empty());

        let forced = scan_document(temp.path(), Path::new("CHANGES.rst"), &config, true).unwrap();
        assert_eq!(ids(&forced), vec!["version-1.0"]);
    }

    #[test]
    fn test_classify_paths() {
        let set = classify_paths(
            &["HISTORY.md".to_string(), "CHANGES.rst".to_string()],
            &default_config(),
        );
        let flags: Vec<_> = set
            .items
            .iter()
            .map(|i| i.data.as_ref().unwrap()["changelog"].as_bool().unwrap())
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_version_refs() {
        let set = version_refs(&["25.5.0".to_string()], &default_config()).unwrap();
        let data = set.items[0].data.as_ref().unwrap();
        assert_eq!(data["uri"], "#version-25.5.0");
        assert_eq!(data["anchor_id"], "version-25.5.0");

        assert!(version_refs(&[" ".to_string()], &default_config()).is_err());
    }

    #[test]
    fn test_scan_outside_root_classifies_by_file_name() {
        let root = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        write(elsewhere.path(), "release-tools/guide.md", "## 1.0 (a)\n");
        write(elsewhere.path(), "notes/CHANGELOG.md", "## 2.0 (b)\n");

        let config = default_config();
        let guide = elsewhere.path().join("release-tools/guide.md");
        let skipped = scan_document(root.path(), &guide, &config, false).unwrap();
        assert!(skipped.is_empty());

        let changelog = elsewhere.path().join("notes/CHANGELOG.md");
        let scanned = scan_document(root.path(), &changelog, &config, false).unwrap();
        assert_eq!(ids(&scanned), vec!["version-2.0"]);
        assert_eq!(scanned.items[0].path.as_deref(), Some("CHANGELOG.md"));
    }

    #[test]
    fn test_issue_links_only_in_changelogs() {
        let temp = tempdir().unwrap();
        write(temp.path(), "CHANGELOG.md", "## 1.0 (a)\n\n- Fix (#12)\n- Plain line\n");
        write(temp.path(), "docs/release-notes.rst", "* Port (other/repo#3)\n");
        write(temp.path(), "index.md", "See (#99)\n");

        let config = RawConfig {
            github_links_repo: Some("conda/conda".to_string()),
            github_links_new_tab: true,
            ..Default::default()
        }
        .validate_links()
        .unwrap();
        let set = issue_links(temp.path(), &config).unwrap();

        let paths: Vec<_> = set.items.iter().filter_map(|i| i.path.as_deref()).collect();
        assert_eq!(paths, vec!["CHANGELOG.md", "docs/release-notes.rst"]);
        assert_eq!(set.items[0].range, Some(RangeLine::line(3)));

        let data = set.items[1].data.as_ref().unwrap();
        assert_eq!(data["original"], "* Port (other/repo#3)");
        assert_eq!(data["links"][0]["url"], "https://github.com/other/repo/issues/3");
        assert_eq!(data["links"][0]["target"], "_blank");
        assert_eq!(
            set.items[1].excerpt.as_deref(),
            Some("* Port (`other/repo#3 <https://github.com/other/repo/issues/3>`__)")
        );
    }
}
