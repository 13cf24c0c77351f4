//! Sequential scrape orchestrator.
//!
//! One row identifier at a time: fetch the modal, parse it, drop bills
//! already seen in this run, hand new ones to the store, and keep the
//! checkpoint file current. Item failures are recorded and the run goes on;
//! only a failed checkpoint write stops it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hrep_api::types::BillHistory;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::checkpoint::{
    write_checkpoint, write_error_details, write_errors, FailedRow, CHECKPOINT_FILE,
    ERRORS_FILE, ERROR_DETAILS_FILE,
};
use crate::config::PipelineConfig;
use crate::db::{BillStore, DbError};
use crate::error::{ItemError, PipelineError};
use crate::fetch::ModalFetcher;
use crate::record::RecordDefaults;
use crate::sections::parse_bill_history;

/// Counts and timing of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub duplicates: usize,
    /// Loaded bills the store already held from an earlier run.
    #[serde(default)]
    pub already_stored: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub bills: Vec<BillHistory>,
    pub failures: Vec<FailedRow>,
    pub summary: RunSummary,
    pub checkpoint_path: PathBuf,
    pub errors_path: PathBuf,
    pub error_details_path: PathBuf,
}

/// What happened to one row identifier, reported to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Added { bill_num: String },
    Duplicate { bill_num: String },
    AlreadyStored { bill_num: String },
    Failed { error: String },
}

pub struct Pipeline<'s, F> {
    fetcher: F,
    store: Option<&'s mut dyn BillStore>,
    checkpoint_path: PathBuf,
    errors_path: PathBuf,
    error_details_path: PathBuf,
    checkpoint_every: usize,
    request_delay: Duration,
    defaults: RecordDefaults,
}

impl<'s, F: ModalFetcher> Pipeline<'s, F> {
    /// A pipeline writing `bills.json`, `bill_history_errors.json` and
    /// `bill_history_error_details.json` into `out_dir`.
    pub fn new(fetcher: F, out_dir: &Path) -> Self {
        Self {
            fetcher,
            store: None,
            checkpoint_path: out_dir.join(CHECKPOINT_FILE),
            errors_path: out_dir.join(ERRORS_FILE),
            error_details_path: out_dir.join(ERROR_DETAILS_FILE),
            checkpoint_every: 5,
            request_delay: Duration::ZERO,
            defaults: RecordDefaults::default(),
        }
    }

    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.checkpoint_every = config.checkpoint_every.max(1);
        self.request_delay = config.request_delay();
        self.defaults = config.record_defaults();
        self
    }

    pub fn with_store(mut self, store: &'s mut dyn BillStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every.max(1);
        self
    }

    pub async fn run(&mut self, row_ids: &[String]) -> Result<RunOutcome, PipelineError> {
        self.run_with(row_ids, |_, _| {}).await
    }

    /// Runs every row id in order, calling `progress` after each one.
    pub async fn run_with<P>(
        &mut self,
        row_ids: &[String],
        mut progress: P,
    ) -> Result<RunOutcome, PipelineError>
    where
        P: FnMut(&str, &ItemOutcome),
    {
        let started_at = Utc::now();
        let mut seen: HashSet<String> = HashSet::new();
        let mut bills: Vec<BillHistory> = Vec::new();
        let mut failures: Vec<FailedRow> = Vec::new();
        let mut duplicates = 0usize;
        let mut already_stored = 0usize;

        info!("Processing {} row ids", row_ids.len());

        for (idx, row_id) in row_ids.iter().enumerate() {
            if idx > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            info!("Loading {}", row_id);
            let outcome = match self.process(row_id, &seen).await {
                Ok(Loaded { bill, .. }) if seen.contains(&bill.bill_num) => {
                    info!("Skipping {}: bill {} already loaded", row_id, bill.bill_num);
                    duplicates += 1;
                    ItemOutcome::Duplicate {
                        bill_num: bill.bill_num,
                    }
                }
                Ok(Loaded {
                    bill,
                    already_stored: was_stored,
                }) => {
                    info!("Loaded {} {}", row_id, bill.bill_num);
                    let bill_num = bill.bill_num.clone();
                    seen.insert(bill_num.clone());
                    bills.push(bill);
                    if bills.len() % self.checkpoint_every == 0 {
                        write_checkpoint(&self.checkpoint_path, &bills)?;
                        info!("Checkpoint: {} bills", bills.len());
                    }
                    if was_stored {
                        already_stored += 1;
                        ItemOutcome::AlreadyStored { bill_num }
                    } else {
                        ItemOutcome::Added { bill_num }
                    }
                }
                Err(err) => {
                    error!("Error on {}: {}", row_id, err);
                    failures.push(FailedRow {
                        row_id: row_id.clone(),
                        error: err.to_string(),
                    });
                    ItemOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            progress(row_id, &outcome);
        }

        write_checkpoint(&self.checkpoint_path, &bills)?;
        write_errors(&self.errors_path, &failures)?;
        write_error_details(&self.error_details_path, &failures)?;

        let summary = RunSummary {
            attempted: row_ids.len(),
            succeeded: bills.len(),
            duplicates,
            already_stored,
            failed: failures.len(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "Done: {} loaded ({} already stored), {} duplicates, {} failed",
            summary.succeeded, summary.already_stored, summary.duplicates, summary.failed
        );

        Ok(RunOutcome {
            bills,
            failures,
            summary,
            checkpoint_path: self.checkpoint_path.clone(),
            errors_path: self.errors_path.clone(),
            error_details_path: self.error_details_path.clone(),
        })
    }

    /// Fetch, parse, and store one row. Bills already in `seen` are returned
    /// without touching the store. A bill the store already holds is still
    /// part of this run's results.
    async fn process(&mut self, row_id: &str, seen: &HashSet<String>) -> Result<Loaded, ItemError> {
        let rows = self.fetcher.fetch_rows(row_id).await?;
        let bill = parse_bill_history(&rows)?;

        let mut already_stored = false;
        if !seen.contains(&bill.bill_num) {
            if let Some(store) = self.store.as_deref_mut() {
                let record = self.defaults.record(bill.clone());
                match store.insert_bill(&record) {
                    Ok(_) => {}
                    Err(DbError::Duplicate {
                        congress_num,
                        bill_num,
                    }) => {
                        warn!(
                            "Bill {} of congress {} already stored, keeping it in the results",
                            bill_num, congress_num
                        );
                        already_stored = true;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(Loaded {
            bill,
            already_stored,
        })
    }
}

/// A parsed bill, and whether the store held it before this run.
struct Loaded {
    bill: BillHistory,
    already_stored: bool,
}
