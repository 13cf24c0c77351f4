//! Bill records as handed to storage.

use hrep_api::types::{BillHistory, CongressHouse};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONGRESS: u32 = 19;

/// Where the House publishes the PDF text of each measure.
pub const DEFAULT_PDF_BASE_URL: &str =
    "https://hrep-website.s3.ap-southeast-1.amazonaws.com/legisdocs/basic_19";

/// A parsed bill plus the fields storage derives for it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(flatten)]
    pub bill: BillHistory,
    pub congress_num: u32,
    pub house: CongressHouse,
    pub source_url: String,
}

/// Values stamped onto every record of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefaults {
    pub congress_num: u32,
    pub house: CongressHouse,
    pub pdf_base_url: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            congress_num: DEFAULT_CONGRESS,
            house: CongressHouse::HouseOfRepresentatives,
            pdf_base_url: DEFAULT_PDF_BASE_URL.to_string(),
        }
    }
}

impl RecordDefaults {
    /// Defaults for another Congress. The PDF folder follows the number.
    pub fn for_congress(congress_num: u32) -> Self {
        Self {
            congress_num,
            house: CongressHouse::HouseOfRepresentatives,
            pdf_base_url: format!(
                "https://hrep-website.s3.ap-southeast-1.amazonaws.com/legisdocs/basic_{}",
                congress_num
            ),
        }
    }

    pub fn source_url(&self, bill_num: &str) -> String {
        format!("{}/{}.pdf", self.pdf_base_url.trim_end_matches('/'), bill_num)
    }

    pub fn record(&self, bill: BillHistory) -> BillRecord {
        BillRecord {
            source_url: self.source_url(&bill.bill_num),
            congress_num: self.congress_num,
            house: self.house,
            bill,
        }
    }
}
