//! Flattening of history-modal markup into ordered table rows.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("invalid selector: cell"));
static EMPHASIS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b, strong").expect("invalid selector: emphasis"));

/// One table row of a bill history modal.
///
/// `text` is the raw text content of the row, or `None` when the row has no
/// cell to read text from. `emphasized` is set when the row contains bold
/// markup, which is how the site marks the bill-number row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowUnit {
    text: Option<String>,
    emphasized: bool,
}

impl RowUnit {
    /// A plain row with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            emphasized: false,
        }
    }

    /// A row whose content is wrapped in bold markup.
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            emphasized: true,
        }
    }

    /// A row without any readable cell.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }

    fn from_element(row: ElementRef<'_>) -> Self {
        let has_cell = row.select(&CELL).next().is_some();
        Self {
            text: has_cell.then(|| row.text().collect::<String>()),
            emphasized: row.select(&EMPHASIS).next().is_some(),
        }
    }
}

/// Selects every `tr` in `html`, at any depth, in document order.
///
/// The modal endpoint answers with bare `<tr>` fragments; an HTML parser
/// drops table rows that appear outside a table, so markup that opens with
/// a table part is wrapped in one before parsing. Tables nested inside the
/// fragment's cells do not change that.
pub fn extract_rows(html: &str) -> Vec<RowUnit> {
    let document = if opens_with_table_part(html) {
        Html::parse_document(&format!("<table>{}</table>", html))
    } else {
        Html::parse_document(html)
    };
    document.select(&ROW).map(RowUnit::from_element).collect()
}

const TABLE_PARTS: [&str; 7] = ["tr", "td", "th", "thead", "tbody", "tfoot", "caption"];

/// Whether the first tag of `html`, after whitespace and comments, is one
/// that is only valid inside a table.
fn opens_with_table_part(html: &str) -> bool {
    let mut rest = html.trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        match comment.find("-->") {
            Some(end) => rest = comment[end + 3..].trim_start(),
            None => return false,
        }
    }

    let Some(tag) = rest.strip_prefix('<') else {
        return false;
    };
    let name: String = tag
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    TABLE_PARTS.contains(&name.as_str())
}
