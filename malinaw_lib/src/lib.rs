//! Library layer for malinaw: bill-history parsing, fetching, and storage.
//!
//! Wraps the `hrep_api` crate with the section parser that turns history
//! modal rows into bills, interchangeable HTTP and browser fetchers, the
//! sequential scrape pipeline with checkpoint files, and SQLite storage.

pub mod checkpoint;
pub mod clean;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod row_ids;
pub mod sections;

pub use hrep_api;
pub use hrep_api::types;
pub use hrep_api::RowUnit;

pub use checkpoint::{load_checkpoint, load_failed_row_ids, CheckpointError, FailedRow};
pub use config::{ConfigError, FetchStrategy, PipelineConfig};
pub use db::{BillFilter, BillStore, Db, DbBillRow, DbError};
pub use error::{ItemError, PipelineError};
pub use fetch::{BrowserModalFetcher, BrowserOptions, FetchError, HttpModalFetcher, ModalFetcher};
pub use pipeline::{ItemOutcome, Pipeline, RunOutcome, RunSummary};
pub use record::{BillRecord, RecordDefaults};
pub use row_ids::{fetch_listing_row_ids, FileRowIds, ListingRowIds, RowIdError, RowIdSource};
pub use sections::{parse_bill_history, parse_history_html, ParseError};
