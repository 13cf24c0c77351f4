//! Modal fetching through a real Chrome session.
//!
//! The site renders the history modal client-side when a bill's "History"
//! anchor is clicked on the listing page. This fetcher drives that flow over
//! the DevTools protocol: click, wait for the modal, read its markup, close.
//! All DevTools calls block, so each item runs on the blocking pool.

use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, LaunchOptions, Tab};
use hrep_api::{extract_rows, RowUnit};
use tracing::{debug, info, warn};

use super::{check_row_count, FetchError, ModalFetcher};
use crate::retry::{retry, RetryPolicy};

const MODAL_SELECTOR: &str = "#HistoryModal";
const CLOSE_SELECTOR: &str = "#HistoryModal button[data-dismiss='modal']";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const MODAL_VISIBLE_JS: &str = r#"(() => {
    const modal = document.querySelector('#HistoryModal');
    if (!modal) { return false; }
    const style = window.getComputedStyle(modal);
    return style.display !== 'none'
        && style.visibility !== 'hidden'
        && modal.getClientRects().length > 0;
})()"#;

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// DevTools websocket of an already running browser. A new headless
    /// browser is launched when unset.
    pub ws_url: Option<String>,
    pub listing_url: String,
    pub open_retries: u32,
    pub close_retries: u32,
    pub modal_timeout: Duration,
    pub min_rows: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            ws_url: None,
            listing_url: "https://www.congress.gov.ph/legisdocs/?v=bills".to_string(),
            open_retries: 6,
            close_retries: 6,
            modal_timeout: Duration::from_secs(5),
            min_rows: 7,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interaction {
    open: RetryPolicy,
    close: RetryPolicy,
    modal_timeout: Duration,
    min_rows: usize,
}

pub struct BrowserModalFetcher {
    // Dropping the browser closes the session, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    interaction: Interaction,
}

impl BrowserModalFetcher {
    /// Connects to or launches Chrome and opens the bills listing page.
    pub async fn start(options: BrowserOptions) -> Result<Self, FetchError> {
        tokio::task::spawn_blocking(move || Self::start_blocking(options)).await?
    }

    fn start_blocking(options: BrowserOptions) -> Result<Self, FetchError> {
        let browser = match &options.ws_url {
            Some(ws_url) => {
                info!("Connecting to browser at {}", ws_url);
                Browser::connect(ws_url.clone()).map_err(browser_err)?
            }
            None => {
                info!("Launching headless browser");
                let launch = LaunchOptions::default_builder()
                    .headless(true)
                    .build()
                    .map_err(browser_err)?;
                Browser::new(launch).map_err(browser_err)?
            }
        };

        let tab = browser.new_tab().map_err(browser_err)?;
        tab.navigate_to(&options.listing_url).map_err(browser_err)?;
        tab.wait_until_navigated().map_err(browser_err)?;
        info!("Listing page loaded: {}", options.listing_url);

        Ok(Self {
            _browser: browser,
            tab,
            interaction: Interaction {
                open: RetryPolicy::new(options.open_retries),
                close: RetryPolicy::new(options.close_retries),
                modal_timeout: options.modal_timeout,
                min_rows: options.min_rows,
            },
        })
    }
}

impl ModalFetcher for BrowserModalFetcher {
    fn fetch_rows(
        &self,
        row_id: &str,
    ) -> impl Future<Output = Result<Vec<RowUnit>, FetchError>> + Send {
        let tab = Arc::clone(&self.tab);
        let interaction = self.interaction;
        let row_id = row_id.to_string();
        async move {
            tokio::task::spawn_blocking(move || fetch_blocking(&*tab, &row_id, interaction))
                .await?
        }
    }
}

/// The DevTools operations one modal fetch needs.
trait ModalTab {
    fn click_anchor(&self, row_id: &str) -> Result<(), FetchError>;
    fn click_close(&self) -> Result<(), FetchError>;
    fn modal_visible(&self) -> Result<bool, FetchError>;
    /// Outer HTML of the modal, or of the whole page when the modal is missing.
    fn modal_html(&self) -> Result<String, FetchError>;
}

impl ModalTab for Tab {
    fn click_anchor(&self, row_id: &str) -> Result<(), FetchError> {
        let anchor = self
            .find_element(&anchor_selector(row_id))
            .map_err(browser_err)?;
        anchor.click().map_err(browser_err)?;
        Ok(())
    }

    fn click_close(&self) -> Result<(), FetchError> {
        let button = self.find_element(CLOSE_SELECTOR).map_err(browser_err)?;
        button.click().map_err(browser_err)?;
        Ok(())
    }

    fn modal_visible(&self) -> Result<bool, FetchError> {
        let result = self.evaluate(MODAL_VISIBLE_JS, false).map_err(browser_err)?;
        Ok(result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    fn modal_html(&self) -> Result<String, FetchError> {
        match self.find_element(MODAL_SELECTOR) {
            Ok(modal) => modal.get_content().map_err(browser_err),
            Err(_) => self.get_content().map_err(browser_err),
        }
    }
}

fn fetch_blocking<T: ModalTab + ?Sized>(
    tab: &T,
    row_id: &str,
    interaction: Interaction,
) -> Result<Vec<RowUnit>, FetchError> {
    let opened = retry(interaction.open, "open history modal", |_| {
        tab.click_anchor(row_id)?;
        wait_for_modal(tab, true, interaction.modal_timeout)
    });
    if let Err(err) = opened {
        warn!("row {}: modal did not open, reading page as is: {}", row_id, err);
    }

    let html = tab.modal_html()?;

    // Nothing to dismiss when the modal never showed.
    if matches!(tab.modal_visible(), Ok(false)) {
        debug!("row {}: modal already hidden", row_id);
    } else {
        let closed = retry(interaction.close, "close history modal", |_| {
            tab.click_close()?;
            wait_for_modal(tab, false, interaction.modal_timeout)
        });
        if let Err(err) = closed {
            warn!("row {}: modal did not close: {}", row_id, err);
        }
    }

    let rows = extract_rows(&html);
    check_row_count(&rows, interaction.min_rows)?;
    Ok(rows)
}

fn wait_for_modal<T: ModalTab + ?Sized>(
    tab: &T,
    visible: bool,
    timeout: Duration,
) -> Result<(), FetchError> {
    let deadline = Instant::now() + timeout;
    loop {
        if tab.modal_visible()? == visible {
            return Ok(());
        }
        if Instant::now() >= deadline {
            let state = if visible { "visible" } else { "hidden" };
            return Err(FetchError::Browser(format!(
                "modal not {} after {}ms",
                state,
                timeout.as_millis()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn anchor_selector(row_id: &str) -> String {
    format!("a[data-id='{}']", row_id.replace('\'', "\\'"))
}

fn browser_err(err: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(err.to_string())
}
