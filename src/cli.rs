//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::{load_config, load_raw_config, ConfigOverrides};
use crate::core::render::{OutputFormat, RenderConfig};

/// vanchor - stable link anchors for version headings in changelogs.
#[derive(Parser, Debug)]
#[command(name = "vanchor")]
#[command(
    author,
    version,
    about,
    long_about = r#"vanchor finds version headings such as "25.5.0 (2025-05-21)" in
changelog-like documents and gives each one a stable anchor identifier
("version-25.5.0") that other documents can link to.

Each command prints a ResultSet in the selected format (default: jsonl).

Configuration is read from vanchor.toml at ROOT (or --config) and can be
overridden with flags:

    version_anchor_pattern = '^(\d+\.\d+(?:\.\d+)?)\s*\(.*?\)$'
    version_anchor_format = "version-{version}"
    version_anchor_changelog_files = ["changelog", "release", "history", "news"]
    github_links_repo = "owner/repo"

Examples:
    vanchor check
    vanchor list --aliases
    vanchor resolve 25.5.0
    vanchor ref 25.5.0
    vanchor lint --strict
    vanchor links --repo conda/conda
"#
)]
pub struct Cli {
    /// Root directory of the documentation tree.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory of the documentation tree (defaults to the current directory).\n\n\
All paths emitted in results are relative to this root."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw (excerpts only)"
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ROOT/vanchor.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pattern selecting version headings; group 1 is the version.
    #[arg(long, global = true, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Anchor identifier template; must contain {version}.
    #[arg(long = "anchor-format", global = true, value_name = "TEMPLATE")]
    pub anchor_format: Option<String>,

    /// Changelog filename markers (comma-separated).
    #[arg(
        long,
        global = true,
        value_name = "MARKERS",
        value_delimiter = ',',
        long_help = "Case-insensitive substrings marking changelog-like documents.\n\n\
Example: --changelog-files changelog,changes,whatsnew"
    )]
    pub changelog_files: Option<Vec<String>>,

    /// Do not register the bare version as an alias.
    #[arg(long, global = true)]
    pub no_alias: bool,

    /// Only match lines recognised as headings.
    #[arg(
        long,
        global = true,
        long_help = "Only match lines recognised as headings: ATX headings (# Title) or a\n\
title line followed by an underline of repeated punctuation (=====)."
    )]
    pub headings_only: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration and print it.
    #[command(
        long_about = "Load and validate the configuration, then emit it as a single config\n\
result item. Fails if the format lacks {version}, the pattern does not compile,\n\
or the pattern has no capture group."
    )]
    Check,

    /// List version anchors registered across ROOT.
    #[command(
        long_about = "Walk ROOT, scan every changelog-like document, and emit one anchor\n\
result per registered identifier, sorted by path and line.\n\n\
Examples:\n\
  vanchor list\n\
  vanchor list --aliases\n"
    )]
    List {
        /// Include bare-version aliases.
        #[arg(long)]
        aliases: bool,
    },

    /// Scan a single document for version headings.
    Scan {
        /// Document path (relative to ROOT unless absolute).
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Scan even if the filename is not changelog-like.
        #[arg(long)]
        force: bool,
    },

    /// Report whether paths are treated as changelog-like documents.
    Classify {
        /// Paths to classify.
        #[arg(value_name = "PATH", required = true, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Find the location an anchor identifier or alias points to.
    Resolve {
        /// Anchor identifier (version-25.5.0) or alias (25.5.0).
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Render version references (anchor identifier and fragment URI).
    Ref {
        /// Versions to reference.
        #[arg(value_name = "VERSION", required = true, num_args = 1..)]
        versions: Vec<String>,
    },

    /// Check for duplicate headings and broken version references.
    #[command(
        long_about = "Build the anchor table for ROOT and report:\n\
- DUPLICATE_VERSION: a version heading repeated in one document\n\
- NO_VERSION_HEADINGS: a changelog document without version headings\n\
- BROKEN_VERSION_REF: a :version:`X` reference with no anchor\n\n\
Issues are emitted as error result items."
    )]
    Lint {
        /// Exit with an error when error-severity issues are found.
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite issue references in changelogs into tracker links.
    #[command(
        long_about = "Walk ROOT and, in every changelog-like document, rewrite parenthesized\n\
issue references into links:\n\n\
  (#123)            -> link to issue 123 of github_links_repo\n\
  (owner/repo#456)  -> link to issue 456 of owner/repo\n\n\
Emits one link result per rewritten line. Markdown documents get [#123](url)\n\
links, reStructuredText documents get anonymous hyperlinks. References inside\n\
code blocks and inline code are left alone.\n\n\
Config keys: github_links_repo (required), github_links_url,\n\
github_links_pattern, github_links_changelog_files, github_links_new_tab.\n\n\
Examples:\n\
  vanchor links --repo conda/conda\n\
  vanchor --format raw links\n"
    )]
    Links {
        /// Default repository (owner/repo) for references without one.
        #[arg(long, value_name = "OWNER/REPO")]
        repo: Option<String>,

        /// Open links in a new tab (Markdown only).
        #[arg(long)]
        new_tab: bool,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let (github_repo, github_new_tab) = match &self.command {
            Commands::Links { repo, new_tab } => (repo.clone(), *new_tab),
            _ => (None, false),
        };
        ConfigOverrides {
            pattern: self.pattern.clone(),
            format: self.anchor_format.clone(),
            changelog_files: self.changelog_files.clone(),
            no_alias: self.no_alias,
            headings_only: self.headings_only,
            github_repo,
            github_new_tab,
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::new(format, cli.pretty);

    let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());

    // Configuration errors abort before any document is read
    let overrides = cli.overrides();
    let config = load_config(&root, cli.config.as_deref(), overrides.clone())?;

    match cli.command {
        Commands::Check => crate::anchors::api::run_check(&config, render_config),

        Commands::List { aliases } => {
            crate::anchors::api::run_list(&root, &config, aliases, render_config)
        }

        Commands::Scan { file, force } => {
            crate::anchors::api::run_scan(&root, &file, &config, force, render_config)
        }

        Commands::Classify { paths } => {
            crate::anchors::api::run_classify(&paths, &config, render_config)
        }

        Commands::Resolve { name } => {
            crate::anchors::api::run_resolve(&root, &config, &name, render_config)
        }

        Commands::Ref { versions } => {
            crate::anchors::api::run_ref(&versions, &config, render_config)
        }

        Commands::Lint { strict } => {
            crate::anchors::lint::run_lint(&root, &config, strict, cli.quiet, render_config)
        }

        Commands::Links { .. } => {
            // Issue link options are only required by this command
            let links =
                load_raw_config(&root, cli.config.as_deref(), overrides)?.validate_links()?;
            crate::anchors::api::run_links(&root, &links, render_config)
        }
    }
}
