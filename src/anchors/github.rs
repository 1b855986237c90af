//! Issue links
//!
//! In changelog-like documents, parenthesized issue references such as
//! `(#123)` or `(owner/repo#456)` are rewritten into links to the issue
//! tracker. Text in code blocks and inline code is left alone.

use serde::Serialize;

use crate::anchors::classify::is_changelog_file;
use crate::anchors::literal::{code_spans, in_code_span, FenceTracker};
use crate::core::config::LinksConfig;

/// Link markup of the document being rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Markdown,
    ReStructuredText,
}

impl Markup {
    /// Markup for a document path, by extension
    pub fn for_path(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.ends_with(".rst") || lower.ends_with(".rest") {
            Markup::ReStructuredText
        } else {
            Markup::Markdown
        }
    }

    /// Render `link` in this markup, without the surrounding parentheses.
    ///
    /// reStructuredText hyperlinks have no target attribute, so `new_tab`
    /// only affects Markdown, where the link becomes inline HTML.
    pub fn render(self, link: &IssueLink, new_tab: bool) -> String {
        match self {
            Markup::ReStructuredText => format!("`{} <{}>`__", link.text, link.url),
            Markup::Markdown if new_tab => format!(
                r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                link.url, link.text
            ),
            Markup::Markdown => format!("[{}]({})", link.text, link.url),
        }
    }
}

/// One issue reference found in a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLink {
    /// Link text: `#N`, or `owner/repo#N` when the reference names a repo
    pub text: String,
    pub repo: String,
    pub number: String,
    pub url: String,

    /// Byte range of the whole match, parentheses included
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
}

/// A line with at least one issue reference, before and after rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedLine {
    /// 1-based line number
    pub line: u32,
    pub original: String,
    pub rewritten: String,
    pub links: Vec<IssueLink>,
}

/// True if issue references in `docname` are rewritten
pub fn is_linked_document(docname: &str, config: &LinksConfig) -> bool {
    is_changelog_file(docname, config.markers())
}

/// Issue references in a single line, skipping inline code
pub fn find_issue_links(line: &str, config: &LinksConfig) -> Vec<IssueLink> {
    let spans = code_spans(line);

    config
        .pattern()
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if in_code_span(&spans, whole.start()) {
                return None;
            }
            let number = caps.get(2)?.as_str();
            let named = caps.get(1).map(|m| m.as_str());

            let repo = named.unwrap_or(config.repo());
            let text = match named {
                Some(repo) => format!("{}#{}", repo, number),
                None => format!("#{}", number),
            };

            Some(IssueLink {
                text,
                repo: repo.to_string(),
                number: number.to_string(),
                url: config.issue_url(repo, number),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Replace each link's match in `line` with its markup, in parentheses
pub fn rewrite_line(line: &str, links: &[IssueLink], markup: Markup, new_tab: bool) -> String {
    let mut output = String::with_capacity(line.len());
    let mut last_end = 0;

    for link in links {
        output.push_str(&line[last_end..link.start]);
        output.push('(');
        output.push_str(&markup.render(link, new_tab));
        output.push(')');
        last_end = link.end;
    }
    output.push_str(&line[last_end..]);

    output
}

/// Lines of `source` that carry issue references, rewritten for `markup`
pub fn rewrite_issue_links(source: &str, markup: Markup, config: &LinksConfig) -> Vec<LinkedLine> {
    let mut fences = FenceTracker::new();
    let mut lines = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        if fences.is_literal(line) {
            continue;
        }
        let links = find_issue_links(line, config);
        if links.is_empty() {
            continue;
        }

        lines.push(LinkedLine {
            line: idx as u32 + 1,
            original: line.to_string(),
            rewritten: rewrite_line(line, &links, markup, config.new_tab()),
            links,
        });
    }

    lines
}
