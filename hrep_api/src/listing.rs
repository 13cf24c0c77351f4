//! Row-identifier discovery on the bills listing page.

use std::sync::LazyLock;

use scraper::{Html, Selector};

static HISTORY_ANCHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href='#HistoryModal'][data-id]").expect("invalid selector: history anchor")
});

/// Collects the `data-id` of every history-modal anchor on a listing page.
///
/// Order follows the document; the same id may appear more than once when a
/// bill is linked from several places on the page.
pub fn extract_row_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&HISTORY_ANCHOR)
        .filter_map(|a| a.value().attr("data-id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
