//! The `row-ids` subcommand: pull row ids out of the bills listing page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use malinaw_lib::hrep_api::Client;
use malinaw_lib::{fetch_listing_row_ids, ListingRowIds, PipelineConfig, RowIdSource};

use crate::output::{print_row_ids, OutputFormat};

/// Arguments for the `row-ids` subcommand.
#[derive(Args)]
pub struct RowIdsArgs {
    /// Saved copy of the bills listing page
    #[arg(long, required_unless_present = "fetch")]
    pub listing: Option<PathBuf>,

    /// Download the listing page from the site instead
    #[arg(long, conflicts_with = "listing")]
    pub fetch: bool,

    /// TOML config file (site URL and request timeout for --fetch)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the ids as a JSON array to this file instead of printing them
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: &RowIdsArgs, format: &OutputFormat) -> Result<()> {
    let ids = match &args.listing {
        Some(path) => ListingRowIds::new(path).row_ids()?,
        None => {
            let config = PipelineConfig::load(args.config.as_deref())?;
            let client = Client::with_base_url(&config.fetch.site_url)?
                .with_timeout(config.fetch.request_timeout())?;
            fetch_listing_row_ids(&client).await?
        }
    };

    match &args.out {
        Some(path) => {
            let json = serde_json::to_string_pretty(&ids)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {} row ids to {}", ids.len(), path.display());
        }
        None => print_row_ids(&ids, format)?,
    }
    Ok(())
}
