//! Checkpoint and error files written by a scrape run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hrep_api::types::BillHistory;
use serde::{Deserialize, Serialize};

pub const CHECKPOINT_FILE: &str = "bills.json";
pub const ERRORS_FILE: &str = "bill_history_errors.json";
pub const ERROR_DETAILS_FILE: &str = "bill_history_error_details.json";

#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One failed row identifier and why it failed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub row_id: String,
    pub error: String,
}

/// Overwrites `path` with the pretty-printed result set.
///
/// The data goes to a sibling temp file first and is renamed over the
/// target, so readers never see a half-written file.
pub fn write_checkpoint(path: &Path, bills: &[BillHistory]) -> Result<(), CheckpointError> {
    write_json_atomic(path, bills)
}

/// Writes the failed row ids as a bare JSON array.
pub fn write_errors(path: &Path, failures: &[FailedRow]) -> Result<(), CheckpointError> {
    let row_ids: Vec<&str> = failures.iter().map(|f| f.row_id.as_str()).collect();
    write_json_atomic(path, &row_ids)
}

/// Writes each failed row id together with its error message.
pub fn write_error_details(path: &Path, failures: &[FailedRow]) -> Result<(), CheckpointError> {
    write_json_atomic(path, failures)
}

pub fn load_checkpoint(path: &Path) -> Result<Vec<BillHistory>, CheckpointError> {
    read_json(path)
}

/// Row ids from an error file, in file order, for re-running failures.
///
/// Accepts both the bare id array and the detailed `{rowId, error}` layout.
pub fn load_failed_row_ids(path: &Path) -> Result<Vec<String>, CheckpointError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Detailed(FailedRow),
        Bare(String),
    }

    let entries: Vec<Entry> = read_json(path)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Detailed(failed) => failed.row_id,
            Entry::Bare(row_id) => row_id,
        })
        .collect())
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    let io_err = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(value).map_err(|source| CheckpointError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = tmp_path(path);
    let mut file = fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CheckpointError> {
    let content = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CheckpointError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
