//! Version heading scanner
//!
//! Walks the lines of a document and yields a [`HeadingMatch`] for every line
//! whose heading text matches the configured version pattern:
//!
//! ```text
//! 25.5.0 (2025-05-21)        <- match target, version "25.5.0"
//! ===================        <- decoration, never a target
//!
//! ## 25.4.0 (2025-04-02)     <- ATX markers stripped before matching
//! ```
//!
//! The scanner is lazy and single-pass; scanning the same text again yields
//! the same matches.

use serde::{Deserialize, Serialize};

use crate::anchors::literal::FenceTracker;
use crate::core::config::AnchorConfig;

/// A version heading found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingMatch {
    /// 1-indexed line number of the heading text
    pub line: u32,

    /// The line as written
    pub raw: String,

    /// Heading text the pattern was matched against
    pub title: String,

    /// Captured version, verbatim
    pub version: String,

    /// Rendered anchor identifier
    pub anchor_id: String,
}

/// Lazy iterator over the version headings of one document
pub struct HeadingScanner<'a> {
    config: &'a AnchorConfig,
    lines: Vec<&'a str>,
    pos: usize,
    fences: FenceTracker,
}

impl<'a> HeadingScanner<'a> {
    pub fn new(source: &'a str, config: &'a AnchorConfig) -> Self {
        Self {
            config,
            lines: source.lines().collect(),
            pos: 0,
            fences: FenceTracker::new(),
        }
    }

    /// Match a single line at index `idx`, or `None` if it is not a version heading
    fn match_line(&self, idx: usize) -> Option<HeadingMatch> {
        let raw = self.lines[idx];
        if is_decoration(raw) {
            return None;
        }

        let (title, is_heading) = match atx_title(raw) {
            Some(title) => (title, true),
            None => {
                let underlined = self
                    .lines
                    .get(idx + 1)
                    .is_some_and(|next| is_decoration(next));
                (raw.trim(), underlined && !raw.starts_with(char::is_whitespace))
            }
        };

        if title.is_empty() || (self.config.headings_only() && !is_heading) {
            return None;
        }

        let version = capture_version(self.config, title)?;
        let anchor_id = self.config.template().render(version);

        Some(HeadingMatch {
            line: idx as u32 + 1,
            raw: raw.to_string(),
            title: title.to_string(),
            version: version.to_string(),
            anchor_id,
        })
    }
}

impl Iterator for HeadingScanner<'_> {
    type Item = HeadingMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.lines.len() {
            let idx = self.pos;
            self.pos += 1;

            if self.fences.is_literal(self.lines[idx]) {
                continue;
            }

            if let Some(found) = self.match_line(idx) {
                return Some(found);
            }
        }
        None
    }
}

/// Scan a document's source for version headings
pub fn scan_headings<'a>(source: &'a str, config: &'a AnchorConfig) -> HeadingScanner<'a> {
    HeadingScanner::new(source, config)
}

/// Apply the configured pattern to heading text.
///
/// The match must start at the beginning of the text; group 1 is the version.
pub fn capture_version<'t>(config: &AnchorConfig, title: &'t str) -> Option<&'t str> {
    let caps = config.pattern().captures(title)?;
    // Leftmost-first search: a match at offset 0 exists iff the first match starts there
    if caps.get(0)?.start() != 0 {
        return None;
    }
    caps.get(1).map(|m| m.as_str())
}

/// A line made of one ASCII punctuation character repeated, e.g. `=====`
pub fn is_decoration(line: &str) -> bool {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_punctuation() && trimmed.len() >= 2 && chars.all(|c| c == first)
}

/// Heading text of an ATX heading (`## Title ##`), if the line is one
fn atx_title(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.len() - rest.trim_start_matches('#').len();
    if level == 0 || level > 6 {
        return None;
    }

    let body = &rest[level..];
    if !body.is_empty() && !body.starts_with([' ', '\t']) {
        return None;
    }

    let body = body.trim();
    // Optional closing sequence must be separated by whitespace
    let without_closing = body.trim_end_matches('#');
    let title = if without_closing.len() == body.len() {
        body
    } else if without_closing.is_empty() || without_closing.ends_with([' ', '\t']) {
        without_closing.trim_end()
    } else {
        body
    };
    Some(title)
}
