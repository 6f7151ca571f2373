//! Config docgen - Command-line tool for generating configuration reference pages.
//!
//! This binary loads application manifests describing configurable classes, their
//! attributes, aliases and flags, and writes one reStructuredText page per target.
//!
//! # Usage
//!
//! ```bash
//! config-docgen [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate every manifest found under a directory:
//! ```bash
//! config-docgen docs/manifests -o docs/source/config/options
//! ```
//!
//! Preview a single target on stdout:
//! ```bash
//! config-docgen docs/manifests/terminal.yaml --stdout
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! config-docgen docs/manifests -v
//! ```

use anyhow::Result;
use clap::Parser;
use config_docgen::cli;
use log::info;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Config docgen starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("Configuration documentation generated successfully");

    Ok(())
}
