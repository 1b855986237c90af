//! Literal text detection
//!
//! Text inside fenced code blocks and inline code spans is shown verbatim,
//! so neither headings nor inline references are recognised there.

use std::ops::Range;

/// True if the line opens or closes a backtick-fenced code block.
///
/// Tilde fences are not recognised: `~~~~` is a common reStructuredText
/// underline and must stay a decoration.
pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Tracks whether a line-by-line walk is inside a fenced code block
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceTracker {
    in_fence: bool,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line; returns true if the line is fence markup or
    /// fenced content and must not be scanned
    pub fn is_literal(&mut self, line: &str) -> bool {
        if is_fence(line) {
            self.in_fence = !self.in_fence;
            return true;
        }
        self.in_fence
    }
}

/// Byte ranges of inline code spans in `line`, delimiters included.
///
/// A run of N backticks opens a span that the next run of exactly N
/// backticks closes; an unmatched run is plain text. This covers Markdown
/// `` `code` `` and reStructuredText ``` ``code`` ``` alike.
pub fn code_spans(line: &str) -> Vec<Range<usize>> {
    let runs = backtick_runs(line);
    let mut spans = Vec::new();
    let mut i = 0;

    while i < runs.len() {
        let open = &runs[i];
        let close = runs[i + 1..]
            .iter()
            .position(|run| run.len() == open.len())
            .map(|offset| i + 1 + offset);

        match close {
            Some(j) => {
                spans.push(open.start..runs[j].end);
                i = j + 1;
            }
            None => i += 1,
        }
    }

    spans
}

/// True if byte offset `pos` falls inside one of `spans`
pub fn in_code_span(spans: &[Range<usize>], pos: usize) -> bool {
    spans.iter().any(|span| span.contains(&pos))
}

fn backtick_runs(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let start = pos;
            while pos < bytes.len() && bytes[pos] == b'`' {
                pos += 1;
            }
            runs.push(start..pos);
        } else {
            pos += 1;
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_tracker() {
        let mut tracker = FenceTracker::new();
        let flags: Vec<_> = ["intro", "```rst", "inside", "```", "after", "~~~~"]
            .iter()
            .map(|line| tracker.is_literal(line))
            .collect();
        assert_eq!(flags, vec![false, true, true, true, false, false]);
    }

    #[test]
    fn test_code_spans_single_and_double() {
        let line = "a `x` b ``y`` c";
        let spans = code_spans(line);
        assert_eq!(spans, vec![2..5, 8..13]);
        assert_eq!(&line[spans[1].clone()], "``y``");
    }

    #[test]
    fn test_code_span_contains_nested_backticks() {
        let line = "Use `` :version:`9.9` `` here";
        let spans = code_spans(line);
        assert_eq!(spans.len(), 1);
        assert!(in_code_span(&spans, line.find(":version:").unwrap()));
    }

    #[test]
    fn test_role_backticks_are_not_around_role_name() {
        let line = "See :version:`1.0` now";
        let spans = code_spans(line);
        assert!(!in_code_span(&spans, line.find(":version:").unwrap()));
    }

    #[test]
    fn test_unmatched_run_is_plain_text() {
        assert!(code_spans("Empty :version:`` here").is_empty());
        assert!(code_spans("no code at all").is_empty());
    }
}
