//! Sources of row identifiers for a scrape run.

use std::fs;
use std::path::{Path, PathBuf};

use hrep_api::{extract_row_ids, Client};

#[derive(thiserror::Error, Debug)]
pub enum RowIdError {
    #[error("failed to read row ids from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid row id list in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies the full ordered list of row identifiers for one run.
///
/// Duplicates are passed through; the pipeline deduplicates on bill number.
pub trait RowIdSource {
    fn row_ids(&self) -> Result<Vec<String>, RowIdError>;
}

/// A file holding either a JSON array of strings or one id per line.
///
/// In the line format blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone)]
pub struct FileRowIds {
    path: PathBuf,
}

impl FileRowIds {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowIdSource for FileRowIds {
    fn row_ids(&self) -> Result<Vec<String>, RowIdError> {
        let content = read(&self.path)?;
        if content.trim_start().starts_with('[') {
            let ids: Vec<String> =
                serde_json::from_str(&content).map_err(|source| RowIdError::Json {
                    path: self.path.clone(),
                    source,
                })?;
            return Ok(ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect());
        }

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

/// A saved copy of the bills listing page.
#[derive(Debug, Clone)]
pub struct ListingRowIds {
    path: PathBuf,
}

impl ListingRowIds {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowIdSource for ListingRowIds {
    fn row_ids(&self) -> Result<Vec<String>, RowIdError> {
        let html = read(&self.path)?;
        let ids = extract_row_ids(&html);
        tracing::info!("Found {} row ids in {}", ids.len(), self.path.display());
        Ok(ids)
    }
}

/// Row ids from the live bills listing page.
pub async fn fetch_listing_row_ids(client: &Client) -> Result<Vec<String>, hrep_api::Error> {
    let html = client.fetch_listing().await?;
    let ids = extract_row_ids(&html);
    tracing::info!("Found {} row ids on {}", ids.len(), client.listing_url()?);
    Ok(ids)
}

fn read(path: &Path) -> Result<String, RowIdError> {
    fs::read_to_string(path).map_err(|source| RowIdError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("row_ids.json");
        fs::write(&path, r#"["58230", " 58231 ", "", "58230"]"#).unwrap();
        assert_eq!(
            FileRowIds::new(&path).row_ids().unwrap(),
            vec!["58230", "58231", "58230"]
        );
    }

    #[test]
    fn reads_line_list_skipping_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("row_ids.txt");
        fs::write(&path, "# 19th congress\n58230\n\n  58231\n# done\n").unwrap();
        assert_eq!(
            FileRowIds::new(&path).row_ids().unwrap(),
            vec!["58230", "58231"]
        );
    }

    #[test]
    fn malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("row_ids.json");
        fs::write(&path, "[58230, ").unwrap();
        assert!(matches!(
            FileRowIds::new(&path).row_ids(),
            Err(RowIdError::Json { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FileRowIds::new("/nonexistent/row_ids.txt")
            .row_ids()
            .unwrap_err();
        assert!(matches!(err, RowIdError::Io { .. }));
    }

    #[test]
    fn reads_listing_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.html");
        fs::write(
            &path,
            r##"<table><tr><td><a href="#HistoryModal" data-id="7">History</a></td></tr></table>"##,
        )
        .unwrap();
        assert_eq!(ListingRowIds::new(&path).row_ids().unwrap(), vec!["7"]);
    }
}
