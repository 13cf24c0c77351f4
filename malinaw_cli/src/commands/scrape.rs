//! The `scrape` subcommand: run the bill-history pipeline.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use malinaw_lib::hrep_api::Client;
use malinaw_lib::{
    load_failed_row_ids, BrowserModalFetcher, Db, FetchStrategy, FileRowIds, HttpModalFetcher,
    ItemOutcome, ListingRowIds, ModalFetcher, Pipeline, PipelineConfig, RowIdSource, RunOutcome,
};

use crate::output::{print_summary, OutputFormat};

/// Arguments for the `scrape` subcommand.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Row ids: a JSON array or one id per line
    #[arg(long)]
    pub row_ids: PathBuf,

    /// Read --row-ids as a saved bills listing page
    #[arg(long)]
    pub listing: bool,

    /// Read --row-ids as the error file of an earlier run
    #[arg(long, conflicts_with = "listing")]
    pub retry_failed: bool,

    /// Fetch strategy: http or browser
    #[arg(long)]
    pub strategy: Option<FetchStrategy>,

    /// Directory for bills.json and bill_history_errors.json
    #[arg(long, default_value = "output")]
    pub out: PathBuf,

    /// Also insert each new bill into this SQLite database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the checkpoint after this many new bills
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Delay between row ids in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// DevTools websocket URL of a running Chrome (browser strategy)
    #[arg(long)]
    pub browser_ws: Option<String>,

    /// Congress number stamped on stored bills
    #[arg(long)]
    pub congress: Option<u32>,
}

pub async fn run(args: &ScrapeArgs, format: &OutputFormat) -> Result<()> {
    let config = build_config(args)?;
    let row_ids = load_row_ids(args)?;
    if row_ids.is_empty() {
        bail!("no row ids found in {}", args.row_ids.display());
    }

    let mut db = match &args.db {
        Some(path) => {
            let db = Db::open(path)?;
            db.init()?;
            Some(db)
        }
        None => None,
    };

    eprintln!(
        "Scraping {} row ids with the {} fetcher into {}",
        row_ids.len(),
        config.fetch.strategy,
        args.out.display()
    );

    let pb = ProgressBar::new(row_ids.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
    )?);

    let outcome = match config.fetch.strategy {
        FetchStrategy::Http => {
            let client = Client::with_base_url(&config.fetch.site_url)?
                .with_timeout(config.fetch.request_timeout())?;
            let fetcher = HttpModalFetcher::new(client).with_min_rows(config.fetch.min_rows());
            run_pipeline(fetcher, &config, &args.out, db.as_mut(), &row_ids, &pb).await?
        }
        FetchStrategy::Browser => {
            let fetcher = BrowserModalFetcher::start(config.browser_options()).await?;
            run_pipeline(fetcher, &config, &args.out, db.as_mut(), &row_ids, &pb).await?
        }
    };
    pb.finish_and_clear();

    if let Some(db) = &db {
        db.record_run(&outcome.summary)?;
    }

    eprintln!(
        "Wrote {} bills to {} and {} failures to {} (messages in {})",
        outcome.bills.len(),
        outcome.checkpoint_path.display(),
        outcome.failures.len(),
        outcome.errors_path.display(),
        outcome.error_details_path.display()
    );
    print_summary(&outcome.summary, format)?;
    Ok(())
}

fn build_config(args: &ScrapeArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(strategy) = args.strategy {
        config.fetch.strategy = strategy;
    }
    if let Some(every) = args.checkpoint_every {
        config.checkpoint_every = every;
    }
    if let Some(delay) = args.delay_ms {
        config.request_delay_ms = delay;
    }
    if let Some(ws) = &args.browser_ws {
        config.fetch.browser_ws = Some(ws.clone());
    }
    if let Some(congress) = args.congress {
        config.congress = congress;
    }
    config.validate()?;
    Ok(config)
}

fn load_row_ids(args: &ScrapeArgs) -> Result<Vec<String>> {
    let ids = if args.retry_failed {
        load_failed_row_ids(&args.row_ids)?
    } else if args.listing {
        ListingRowIds::new(&args.row_ids).row_ids()?
    } else {
        FileRowIds::new(&args.row_ids).row_ids()?
    };
    Ok(ids)
}

async fn run_pipeline<F: ModalFetcher>(
    fetcher: F,
    config: &PipelineConfig,
    out: &Path,
    db: Option<&mut Db>,
    row_ids: &[String],
    pb: &ProgressBar,
) -> Result<RunOutcome> {
    let mut pipeline = Pipeline::new(fetcher, out).with_config(config);
    if let Some(db) = db {
        pipeline = pipeline.with_store(db);
    }

    let outcome = pipeline
        .run_with(row_ids, |row_id, outcome| {
            pb.inc(1);
            match outcome {
                ItemOutcome::Added { bill_num } => pb.set_message(format!("{} {}", row_id, bill_num)),
                ItemOutcome::Duplicate { bill_num } => {
                    pb.set_message(format!("{} duplicate {}", row_id, bill_num))
                }
                ItemOutcome::AlreadyStored { bill_num } => {
                    pb.set_message(format!("{} {} already stored", row_id, bill_num))
                }
                ItemOutcome::Failed { .. } => pb.set_message(format!("{} failed", row_id)),
            }
        })
        .await?;
    Ok(outcome)
}
