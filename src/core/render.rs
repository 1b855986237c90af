//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use crate::core::model::{Kind, ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render and print to stdout
    pub fn print(&self, result_set: &ResultSet) {
        let output = self.render(result_set);
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let of_kind = |kind: Kind| -> Vec<&ResultItem> {
            result_set
                .items
                .iter()
                .filter(|item| item.kind == kind)
                .collect()
        };

        let errors = of_kind(Kind::Error);
        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}", error.code, error.message));
                    if let Some(path) = &item.path {
                        output.push_str(&format!(" (`{}`", path));
                        if let Some(range) = &item.range {
                            output.push_str(&format!(":{}", range.start));
                        }
                        output.push(')');
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        for item in of_kind(Kind::Config) {
            output.push_str("## Configuration\n\n");
            if let Some(serde_json::Value::Object(map)) = &item.data {
                for (key, value) in map {
                    output.push_str(&format!("- `{}`: `{}`\n", key, value));
                }
            }
            output.push('\n');
        }

        let files = of_kind(Kind::File);
        if !files.is_empty() {
            output.push_str("## Documents\n\n");
            for item in files {
                if let Some(path) = &item.path {
                    let changelog = item
                        .data
                        .as_ref()
                        .and_then(|d| d.get("changelog"))
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    let label = if changelog { "changelog" } else { "skipped" };
                    output.push_str(&format!("- `{}` ({})\n", path, label));
                }
            }
            output.push('\n');
        }

        let anchors = of_kind(Kind::Anchor);
        if !anchors.is_empty() {
            output.push_str("## Anchors\n\n");
            output.push_str("| Anchor | Location | Heading |\n");
            output.push_str("|---|---|---|\n");
            for item in anchors {
                let id = data_str(item, "id").unwrap_or("");
                let location = match (&item.path, &item.range) {
                    (Some(path), Some(range)) => format!("{}:{}", path, range.start),
                    (Some(path), None) => path.clone(),
                    _ => String::new(),
                };
                let heading = item.excerpt.as_deref().unwrap_or("").replace('|', "\\|");
                let alias = data_str(item, "alias_of")
                    .map(|target| format!(" → `{}`", target))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "| `#{}`{} | `{}` | {} |\n",
                    id, alias, location, heading
                ));
            }
            output.push('\n');
        }

        let references = of_kind(Kind::Reference);
        if !references.is_empty() {
            output.push_str("## References\n\n");
            for item in references {
                let version = data_str(item, "version").unwrap_or("");
                let uri = data_str(item, "uri").unwrap_or("");
                output.push_str(&format!("- [{}]({})\n", version, uri));
            }
            output.push('\n');
        }

        let links = of_kind(Kind::Link);
        if !links.is_empty() {
            output.push_str("## Issue links\n\n");
            for item in links {
                let location = match (&item.path, &item.range) {
                    (Some(path), Some(range)) => format!("{}:{}", path, range.start),
                    (Some(path), None) => path.clone(),
                    _ => String::new(),
                };
                output.push_str(&format!(
                    "- `{}`: {}\n",
                    location,
                    item.excerpt.as_deref().unwrap_or("")
                ));
            }
            output.push('\n');
        }

        output
    }

    /// Render as raw output (for debugging)
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| item.excerpt.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn data_str<'a>(item: &'a ResultItem, key: &str) -> Option<&'a str> {
    item.data.as_ref()?.get(key)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{RangeLine, ResultItem, VanchorError};
    use serde_json::json;

    fn anchor_set() -> ResultSet {
        let mut set = ResultSet::new();
        set.push(
            ResultItem::anchor("CHANGELOG.md", RangeLine::line(3))
                .with_excerpt("## 25.5.0 (2025-05-21)")
                .with_data(json!({"id": "version-25.5.0", "version": "25.5.0"})),
        );
        set.push(
            ResultItem::anchor("CHANGELOG.md", RangeLine::line(3))
                .with_excerpt("## 25.5.0 (2025-05-21)")
                .with_data(
                    json!({"id": "25.5.0", "version": "25.5.0", "alias_of": "version-25.5.0"}),
                ),
        );
        set
    }

    #[test]
    fn test_render_jsonl() {
        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Jsonl, false));
        let output = renderer.render(&anchor_set());

        assert_eq!(output.lines().count(), 2);
        assert!(output.contains("\"id\":\"version-25.5.0\""));
    }

    #[test]
    fn test_render_json() {
        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Json, false));
        let output = renderer.render(&anchor_set());

        assert!(output.starts_with('['));
        assert!(output.ends_with(']'));
    }

    #[test]
    fn test_render_jsonl_pretty() {
        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Jsonl, true));
        let output = renderer.render(&anchor_set());
        assert!(output.contains("\n\n"));
        assert!(output.contains("  \"kind\": \"anchor\""));
    }

    #[test]
    fn test_render_markdown_anchors() {
        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Markdown, false));
        let output = renderer.render(&anchor_set());

        assert!(output.contains("## Anchors"));
        assert!(output.contains("| `#version-25.5.0` | `CHANGELOG.md:3` | ## 25.5.0 (2025-05-21) |"));
        assert!(output.contains("`#25.5.0` → `version-25.5.0`"));
    }

    #[test]
    fn test_render_markdown_issue_links() {
        let mut set = ResultSet::new();
        set.push(
            ResultItem::link("CHANGELOG.md", RangeLine::line(4))
                .with_excerpt("- Fix ([#1](https://github.com/a/b/issues/1))"),
        );

        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Markdown, false));
        let output = renderer.render(&set);

        assert!(output.contains("## Issue links"));
        assert!(output.contains("- `CHANGELOG.md:4`: - Fix ([#1](https://github.com/a/b/issues/1))"));
    }

    #[test]
    fn test_render_markdown_errors_and_references() {
        let mut set = ResultSet::new();
        let mut error = ResultItem::error(VanchorError::new("BROKEN_VERSION_REF", "no anchor"));
        error.path = Some("index.md".to_string());
        error.range = Some(RangeLine::line(7));
        set.push(error);
        set.push(ResultItem::reference(
            json!({"version": "1.0", "uri": "#version-1.0"}),
        ));

        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Markdown, false));
        let output = renderer.render(&set);

        assert!(output.contains("- **BROKEN_VERSION_REF**: no anchor (`index.md`:7)"));
        assert!(output.contains("- [1.0](#version-1.0)"));
    }

    #[test]
    fn test_render_raw() {
        let renderer = Renderer::new(RenderConfig::new(OutputFormat::Raw, false));
        let output = renderer.render(&anchor_set());
        assert_eq!(output, "## 25.5.0 (2025-05-21)\n## 25.5.0 (2025-05-21)");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "Markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!("raw".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
    }

    #[test]
    fn test_output_format_parse_invalid() {
        let result = "html".parse::<OutputFormat>();
        assert!(result.unwrap_err().contains("Unknown format"));
    }

    #[test]
    fn test_render_config_default() {
        let config = RenderConfig::default();
        assert_eq!(config.format, OutputFormat::Jsonl);
        assert!(!config.pretty);
    }
}
