//! HTTP client for the House legislative-documents site.

use std::time::Duration;

use reqwest::multipart::Form;
use url::Url;

use crate::{rows::extract_rows, user_agent::get_user_agent, Error, RowUnit};

const DEFAULT_BASE_URL: &str = "https://www.congress.gov.ph";
const HISTORY_PATH: &str = "/legisdocs/fetch_history.php";
const LISTING_PATH: &str = "/legisdocs/?v=bills";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the bill-history modal endpoint and the bills listing.
///
/// The underlying `reqwest::Client` is built once with a randomized
/// browser user agent and a request timeout.
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production site.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            http: build_http(DEFAULT_TIMEOUT)?,
        })
    }

    /// Replaces the request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            base_url: self.base_url,
            http: build_http(timeout)?,
        })
    }

    pub fn history_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(HISTORY_PATH)?)
    }

    pub fn listing_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(LISTING_PATH)?)
    }

    /// Posts `row_id` as the `rowid` form field and returns the modal markup.
    pub async fn fetch_history(&self, row_id: &str) -> Result<String, Error> {
        let url = self.history_url()?;
        let form = Form::new().text("rowid", row_id.to_string());
        let resp = self
            .http
            .post(url)
            .header("accept", "text/html,*/*;q=0.8")
            .header("accept-language", "en-US,en;q=0.9")
            .header("x-requested-with", "XMLHttpRequest")
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to request history for {}: {}", row_id, e);
                Error::RequestFailed(e)
            })?;
        read_html(resp).await
    }

    /// Fetches the modal for `row_id` and flattens it into table rows.
    pub async fn fetch_history_rows(&self, row_id: &str) -> Result<Vec<RowUnit>, Error> {
        let html = self.fetch_history(row_id).await?;
        Ok(extract_rows(&html))
    }

    /// Downloads the bills listing page.
    pub async fn fetch_listing(&self) -> Result<String, Error> {
        let url = self.listing_url()?;
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("cache-control", "no-cache")
            .send()
            .await?;
        read_html(resp).await
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, Error> {
    let http = reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(timeout)
        .build()?;
    Ok(http)
}

async fn read_html(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        Error::RequestFailed(e)
    })?;

    if !status.is_success() {
        let snippet = truncate_body(&body);
        tracing::error!("Request failed with status {}: {}", status, snippet);
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: snippet,
        });
    }

    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
