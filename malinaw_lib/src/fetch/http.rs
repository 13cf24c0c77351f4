use std::future::Future;

use hrep_api::{Client, RowUnit};

use super::{check_row_count, FetchError, ModalFetcher};

/// Fetches modals by posting the row id straight to the modal endpoint.
///
/// Transport and status failures surface immediately; there is no retry.
pub struct HttpModalFetcher {
    client: Client,
    min_rows: usize,
}

impl HttpModalFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            min_rows: 1,
        }
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }
}

impl ModalFetcher for HttpModalFetcher {
    fn fetch_rows(
        &self,
        row_id: &str,
    ) -> impl Future<Output = Result<Vec<RowUnit>, FetchError>> + Send {
        async move {
            let rows = self.client.fetch_history_rows(row_id).await?;
            tracing::debug!("row {}: {} rows in history modal", row_id, rows.len());
            check_row_count(&rows, self.min_rows)?;
            Ok(rows)
        }
    }
}
