//! Strategies for retrieving the rows of one bill history modal.

mod browser;
mod http;

use std::future::Future;

use hrep_api::RowUnit;

pub use browser::{BrowserModalFetcher, BrowserOptions};
pub use http::HttpModalFetcher;

/// Retrieves the rows of the history modal for one row identifier.
///
/// Implementations are selected at startup; the pipeline is generic over
/// them and awaits exactly one call per item.
pub trait ModalFetcher {
    fn fetch_rows(
        &self,
        row_id: &str,
    ) -> impl Future<Output = Result<Vec<RowUnit>, FetchError>> + Send;
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("modal request failed: {0}")]
    Api(#[from] hrep_api::Error),
    #[error("browser automation failed: {0}")]
    Browser(String),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("browser task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The modal came back with fewer rows than any real bill has.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("expected at least {expected} rows in history modal, found {found}")]
pub struct StructuralError {
    pub expected: usize,
    pub found: usize,
}

pub(crate) fn check_row_count(rows: &[RowUnit], min_rows: usize) -> Result<(), StructuralError> {
    let expected = min_rows.max(1);
    if rows.len() < expected {
        return Err(StructuralError {
            expected,
            found: rows.len(),
        });
    }
    Ok(())
}
