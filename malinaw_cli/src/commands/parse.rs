//! The `parse` subcommand: parse one saved history modal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use malinaw_lib::parse_history_html;

use crate::output::{print_bills, OutputFormat};

/// Arguments for the `parse` subcommand.
#[derive(Args)]
pub struct ParseArgs {
    /// HTML file holding the modal rows
    pub file: PathBuf,
}

pub fn run(args: &ParseArgs, format: &OutputFormat) -> Result<()> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let bill = parse_history_html(&html)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    print_bills(&[bill], format)
}
