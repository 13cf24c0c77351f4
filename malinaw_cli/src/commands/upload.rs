//! The `upload` subcommand: insert a checkpoint into SQLite.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use malinaw_lib::{load_checkpoint, BillStore, Db, DbError, PipelineConfig, RecordDefaults};

use crate::output::{print_json, OutputFormat};

/// Arguments for the `upload` subcommand.
#[derive(Args)]
pub struct UploadArgs {
    /// Checkpoint file written by `scrape`
    #[arg(long)]
    pub checkpoint: PathBuf,

    /// SQLite database path
    #[arg(long, default_value = "malinaw.db")]
    pub db: PathBuf,

    /// Congress number stamped on the bills
    #[arg(long)]
    pub congress: Option<u32>,
}

pub fn run(args: &UploadArgs, format: &OutputFormat) -> Result<()> {
    let config = PipelineConfig::load(None)?;
    let defaults = RecordDefaults::for_congress(args.congress.unwrap_or(config.congress));

    let bills = load_checkpoint(&args.checkpoint)?;
    let mut db = Db::open(&args.db)?;
    db.init()?;

    let mut inserted = 0usize;
    let mut duplicates = Vec::new();
    for bill in bills {
        let record = defaults.record(bill);
        match db.insert_bill(&record) {
            Ok(_) => inserted += 1,
            Err(DbError::Duplicate { bill_num, .. }) => {
                eprintln!("Skipping {}: already stored", bill_num);
                duplicates.push(bill_num);
            }
            Err(e) => return Err(e.into()),
        }
    }

    eprintln!(
        "Inserted {} bills into {} ({} duplicates skipped)",
        inserted,
        args.db.display(),
        duplicates.len()
    );
    if *format == OutputFormat::Json {
        print_json(&serde_json::json!({
            "inserted": inserted,
            "duplicates": duplicates,
        }));
    }
    Ok(())
}
