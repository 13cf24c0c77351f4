//! Error types for the pipeline layer.

use std::fmt;

use crate::checkpoint::CheckpointError;
use crate::db::DbError;
use crate::fetch::FetchError;
use crate::sections::ParseError;

/// Why a single row identifier produced no record. Recorded, never fatal.
#[derive(Debug)]
pub enum ItemError {
    /// Transport, status, browser, or row-count failure.
    Fetch(FetchError),
    /// The modal did not hold a complete bill.
    Parse(ParseError),
    /// The store refused the record.
    Store(DbError),
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<FetchError> for ItemError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ParseError> for ItemError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<DbError> for ItemError {
    fn from(e: DbError) -> Self {
        Self::Store(e)
    }
}

/// Errors that abort a run.
#[derive(Debug)]
pub enum PipelineError {
    /// Results could not be written durably.
    Checkpoint(CheckpointError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkpoint(e) => write!(f, "Checkpoint error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Checkpoint(e) => Some(e),
        }
    }
}

impl From<CheckpointError> for PipelineError {
    fn from(e: CheckpointError) -> Self {
        Self::Checkpoint(e)
    }
}
