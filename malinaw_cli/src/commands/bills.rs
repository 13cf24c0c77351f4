//! The `bills` subcommand: list bills from the SQLite store.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use malinaw_lib::types::Significance;
use malinaw_lib::{BillFilter, Db};

use crate::output::{print_stored_bills, OutputFormat};

/// Arguments for the `bills` subcommand.
#[derive(Args)]
pub struct BillsArgs {
    /// SQLite database path
    #[arg(long, default_value = "malinaw.db")]
    pub db: PathBuf,

    /// Only bills of this Congress
    #[arg(long)]
    pub congress: Option<u32>,

    /// NATIONAL or LOCAL
    #[arg(long)]
    pub significance: Option<String>,

    /// Match bill number, title, or short title
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum number of bills
    #[arg(long, default_value = "50")]
    pub limit: i64,
}

pub fn run(args: &BillsArgs, format: &OutputFormat) -> Result<()> {
    let significance = args
        .significance
        .as_deref()
        .map(|s| s.trim().to_uppercase().parse::<Significance>())
        .transpose()?;

    let db = Db::open(&args.db)?;
    db.init()?;

    if let Some(last) = db.last_run()? {
        eprintln!(
            "{} bills stored; last scrape finished {} ({} loaded, {} failed)",
            db.bill_count()?,
            last.finished_at.format("%Y-%m-%d %H:%M UTC"),
            last.succeeded,
            last.failed
        );
    }

    let rows = db.query_bills(&BillFilter {
        congress_num: args.congress,
        significance,
        search: args.search.clone(),
        limit: Some(args.limit),
    })?;
    print_stored_bills(&rows, format)
}
