//! Anchor identifier templates
//!
//! A template is a plain string containing the `{version}` placeholder, e.g.
//! `version-{version}` or `release-{version}`. Rendering is a literal
//! find-and-replace; no other placeholders are accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::ConfigError;

/// The only placeholder a template may contain
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Any `{...}` token in a template
pub static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("Invalid PLACEHOLDER_RE regex"));

/// A validated anchor identifier template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTemplate {
    raw: String,
}

impl AnchorTemplate {
    /// Validate a template string.
    ///
    /// Fails if `{version}` is absent, or if any other `{...}` placeholder
    /// appears alongside it.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if !raw.contains(VERSION_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(raw.to_string()));
        }

        if let Some(other) = PLACEHOLDER_RE
            .find_iter(raw)
            .map(|m| m.as_str())
            .find(|token| *token != VERSION_PLACEHOLDER)
        {
            return Err(ConfigError::InvalidPlaceholder {
                placeholder: other.to_string(),
                format: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Substitute `version` into every placeholder
    pub fn render(&self, version: &str) -> String {
        self.raw.replace(VERSION_PLACEHOLDER, version)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_format() {
        let template = AnchorTemplate::parse("version-{version}").unwrap();
        assert_eq!(template.render("25.5.0"), "version-25.5.0");
    }

    #[test]
    fn test_render_custom_formats() {
        let cases = [
            ("v{version}", "25.5.0", "v25.5.0"),
            ("release-{version}", "2.0", "release-2.0"),
            ("{version}", "0.1.0", "0.1.0"),
        ];
        for (raw, version, expected) in cases {
            let template = AnchorTemplate::parse(raw).unwrap();
            assert_eq!(template.render(version), expected, "template {raw}");
        }
    }

    #[test]
    fn test_render_is_verbatim() {
        let template = AnchorTemplate::parse("v{version}").unwrap();
        assert_eq!(template.render("1.0 beta"), "v1.0 beta");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let template = AnchorTemplate::parse("{version}-{version}").unwrap();
        assert_eq!(template.render("1.2"), "1.2-1.2");
    }

    #[test]
    fn test_missing_placeholder() {
        for raw in [
            "no-placeholder",
            "version-only",
            "prefix-{ver}-suffix",
            "version-{VERSION}",
            "{version-typo}",
            "",
        ] {
            let err = AnchorTemplate::parse(raw).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingPlaceholder(_)),
                "expected MissingPlaceholder for {raw:?}, got {err:?}"
            );
            assert!(err.to_string().contains("must contain '{version}' placeholder"));
        }
    }

    #[test]
    fn test_extra_placeholder_rejected() {
        let err = AnchorTemplate::parse("{project}-{version}").unwrap_err();
        match err {
            ConfigError::InvalidPlaceholder {
                placeholder,
                format,
            } => {
                assert_eq!(placeholder, "{project}");
                assert_eq!(format, "{project}-{version}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
