//! vanchor - stable link anchors for version headings in changelogs
//!
//! vanchor provides:
//! - Changelog document detection by filename markers
//! - Version heading scanning with a configurable pattern
//! - Anchor identifiers and bare-version aliases in one label table
//! - Version references and lint checks across a docs tree
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod anchors;
mod backends;
mod cli;
mod core;

/// Environment variable overriding the log filter
const LOG_ENV: &str = "VANCHOR_LOG";

fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "vanchor=debug"
    } else if quiet {
        "vanchor=error"
    } else {
        "vanchor=warn"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.quiet, cli.verbose);

    cli::run(cli)
}
