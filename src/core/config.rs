//! Version anchor configuration
//!
//! Options are read once per build from `vanchor.toml` (if present), then
//! overridden by command-line flags, then validated into an immutable
//! [`AnchorConfig`] that every scan borrows. Validation failures abort the
//! build before any document is read.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::anchors::template::{AnchorTemplate, PLACEHOLDER_RE};

/// Default heading pattern: dotted numeric version followed by a parenthetical
pub const DEFAULT_VERSION_PATTERN: &str = r"^(\d+\.\d+(?:\.\d+)?)\s*\(.*?\)$";

/// Default anchor identifier template
pub const DEFAULT_ANCHOR_FORMAT: &str = "version-{version}";

/// Default filename markers for changelog-like documents
pub const DEFAULT_CHANGELOG_FILES: &[&str] = &["changelog", "release", "history", "news"];

/// Default issue URL template
pub const DEFAULT_ISSUE_URL: &str = "https://github.com/{repo}/issues/{number}";

/// Default issue reference pattern: `(#123)` or `(owner/repo#123)`
pub const DEFAULT_ISSUE_PATTERN: &str = r"\((?:([^/\s]+/[^/\s]+)#|#)(\d+)\)";

/// Config file looked up at the root
pub const CONFIG_FILE_NAME: &str = "vanchor.toml";

/// Fatal configuration errors, surfaced before any document is scanned
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "version_anchor_format must contain '{{version}}' placeholder. Got: '{0}'. \
         Example valid formats: 'version-{{version}}', 'v{{version}}', 'release-{{version}}'"
    )]
    MissingPlaceholder(String),

    #[error(
        "version_anchor_format contains invalid placeholder {placeholder}. \
         Only '{{version}}' is supported. Got: '{format}'"
    )]
    InvalidPlaceholder { placeholder: String, format: String },

    #[error("version_anchor_pattern is invalid: {0}")]
    Pattern(#[from] regex::Error),

    #[error("version_anchor_pattern must contain a capture group for the version. Got: '{0}'")]
    MissingCaptureGroup(String),

    #[error(
        "github_links_repo is required to rewrite issue references. \
         Set it in vanchor.toml (github_links_repo = 'owner/repo') or pass --repo"
    )]
    MissingRepo,

    #[error("github_links_repo must be in 'owner/repo' format, got: '{0}'")]
    InvalidRepo(String),

    #[error("github_links_pattern is invalid: {0}")]
    LinkPattern(#[source] regex::Error),

    #[error(
        "github_links_pattern must contain two capture groups (repository, issue number). \
         Got: '{0}'"
    )]
    LinkPatternGroups(String),

    #[error(
        "github_links_url contains invalid placeholder {placeholder}. \
         Only '{{repo}}' and '{{number}}' are supported. Got: '{url}'"
    )]
    InvalidUrlPlaceholder { placeholder: String, url: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Unvalidated options as written in `vanchor.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Pattern selecting heading lines; group 1 is the version
    pub version_anchor_pattern: String,

    /// Template rendering a version into an anchor identifier
    pub version_anchor_format: String,

    /// Case-insensitive substrings marking changelog-like documents
    pub version_anchor_changelog_files: Vec<String>,

    /// Also register the bare version as an alias
    pub version_anchor_alias: bool,

    /// Only consider lines recognised as headings
    pub version_anchor_headings_only: bool,

    /// Default repository for `(#123)` issue references
    pub github_links_repo: Option<String>,

    /// Issue URL template with `{repo}` and `{number}`
    pub github_links_url: String,

    /// Issue reference pattern; group 1 is an optional repository, group 2 the number
    pub github_links_pattern: String,

    /// Filename markers for documents whose issue references are rewritten
    pub github_links_changelog_files: Vec<String>,

    /// Render issue links that open in a new tab
    pub github_links_new_tab: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            version_anchor_pattern: DEFAULT_VERSION_PATTERN.to_string(),
            version_anchor_format: DEFAULT_ANCHOR_FORMAT.to_string(),
            version_anchor_changelog_files: DEFAULT_CHANGELOG_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            version_anchor_alias: true,
            version_anchor_headings_only: false,
            github_links_repo: None,
            github_links_url: DEFAULT_ISSUE_URL.to_string(),
            github_links_pattern: DEFAULT_ISSUE_PATTERN.to_string(),
            github_links_changelog_files: DEFAULT_CHANGELOG_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            github_links_new_tab: false,
        }
    }
}

/// Command-line overrides applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub changelog_files: Option<Vec<String>>,
    pub no_alias: bool,
    pub headings_only: bool,
    pub github_repo: Option<String>,
    pub github_new_tab: bool,
}

impl RawConfig {
    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `vanchor.toml` from `root`, falling back to defaults when absent
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Loading config file");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(pattern) = overrides.pattern {
            self.version_anchor_pattern = pattern;
        }
        if let Some(format) = overrides.format {
            self.version_anchor_format = format;
        }
        if let Some(files) = overrides.changelog_files {
            self.version_anchor_changelog_files = files;
        }
        if overrides.no_alias {
            self.version_anchor_alias = false;
        }
        if overrides.headings_only {
            self.version_anchor_headings_only = true;
        }
        if let Some(repo) = overrides.github_repo {
            self.github_links_repo = Some(repo);
        }
        if overrides.github_new_tab {
            self.github_links_new_tab = true;
        }
        self
    }

    /// Validate into an immutable [`AnchorConfig`]
    pub fn validate(self) -> Result<AnchorConfig, ConfigError> {
        let template = AnchorTemplate::parse(&self.version_anchor_format)?;

        let pattern = Regex::new(&self.version_anchor_pattern)?;
        // captures_len counts the implicit whole-match group
        if pattern.captures_len() < 2 {
            return Err(ConfigError::MissingCaptureGroup(
                self.version_anchor_pattern,
            ));
        }

        Ok(AnchorConfig {
            pattern,
            template,
            markers: normalize_markers(&self.version_anchor_changelog_files),
            alias: self.version_anchor_alias,
            headings_only: self.version_anchor_headings_only,
        })
    }
}

impl RawConfig {
    /// Validate the issue link options into a [`LinksConfig`].
    ///
    /// Only needed by `links`, so a missing repository does not stop other
    /// commands.
    pub fn validate_links(&self) -> Result<LinksConfig, ConfigError> {
        let repo = validate_repo(self.github_links_repo.as_deref())?;

        if let Some(placeholder) = PLACEHOLDER_RE
            .find_iter(&self.github_links_url)
            .map(|m| m.as_str())
            .find(|token| !ISSUE_URL_PLACEHOLDERS.contains(token))
        {
            return Err(ConfigError::InvalidUrlPlaceholder {
                placeholder: placeholder.to_string(),
                url: self.github_links_url.clone(),
            });
        }

        let pattern = Regex::new(&self.github_links_pattern).map_err(ConfigError::LinkPattern)?;
        if pattern.captures_len() < 3 {
            return Err(ConfigError::LinkPatternGroups(
                self.github_links_pattern.clone(),
            ));
        }

        Ok(LinksConfig {
            repo,
            url: self.github_links_url.clone(),
            pattern,
            markers: normalize_markers(&self.github_links_changelog_files),
            new_tab: self.github_links_new_tab,
        })
    }
}

/// Placeholders an issue URL template may contain
const ISSUE_URL_PLACEHOLDERS: &[&str] = &["{repo}", "{number}"];

/// Check `owner/repo` shape: exactly one slash, both parts non-blank
fn validate_repo(repo: Option<&str>) -> Result<String, ConfigError> {
    let repo = match repo {
        Some(repo) if !repo.is_empty() => repo,
        _ => return Err(ConfigError::MissingRepo),
    };

    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|part| part.trim().is_empty()) {
        return Err(ConfigError::InvalidRepo(repo.to_string()));
    }
    Ok(repo.to_string())
}

/// Lowercase and trim markers, dropping empty ones
fn normalize_markers(markers: &[String]) -> Vec<String> {
    markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| {
            if m.is_empty() {
                tracing::warn!("Ignoring empty changelog file marker");
            }
            !m.is_empty()
        })
        .collect()
}

/// Read the config file (or defaults) and apply command-line overrides
pub fn load_raw_config(
    root: &Path,
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<RawConfig, ConfigError> {
    let raw = match explicit {
        Some(path) => RawConfig::load(path)?,
        None => RawConfig::discover(root)?,
    };
    Ok(raw.with_overrides(overrides))
}

/// Load, override and validate the configuration for one build.
///
/// `explicit` names a config file that must exist; otherwise `vanchor.toml`
/// is looked up at `root`.
pub fn load_config(
    root: &Path,
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<AnchorConfig, ConfigError> {
    let config = load_raw_config(root, explicit, overrides)?.validate()?;
    tracing::debug!(
        pattern = config.pattern().as_str(),
        format = config.template().as_str(),
        "Configuration validated"
    );
    Ok(config)
}

/// Validated configuration shared read-only by every document of one build
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    pattern: Regex,
    template: AnchorTemplate,
    markers: Vec<String>,
    alias: bool,
    headings_only: bool,
}

impl AnchorConfig {
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn template(&self) -> &AnchorTemplate {
        &self.template
    }

    /// Lowercased changelog markers
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn alias(&self) -> bool {
        self.alias
    }

    pub fn headings_only(&self) -> bool {
        self.headings_only
    }

    /// Summary as JSON, for `check` output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "version_anchor_pattern": self.pattern.as_str(),
            "version_anchor_format": self.template.as_str(),
            "version_anchor_changelog_files": self.markers,
            "version_anchor_alias": self.alias,
            "version_anchor_headings_only": self.headings_only,
        })
    }
}

/// Validated issue link options
#[derive(Debug, Clone)]
pub struct LinksConfig {
    repo: String,
    url: String,
    pattern: Regex,
    markers: Vec<String>,
    new_tab: bool,
}

impl LinksConfig {
    /// Repository used when a reference names none
    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn new_tab(&self) -> bool {
        self.new_tab
    }

    /// Issue URL for `number` in `repo`
    pub fn issue_url(&self, repo: &str, number: &str) -> String {
        self.url.replace("{repo}", repo).replace("{number}", number)
    }
}
