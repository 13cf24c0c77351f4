//! Bill history types shared by the scraper, the checkpoint files, and storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One bill as read from its history modal on the legislative-documents site.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillHistory {
    /// Bill number, the natural key (e.g. "HB00123").
    pub bill_num: String,

    /// Full title of the measure.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,

    /// Raw date text as shown on the site.
    pub date_filed: String,

    pub significance: Significance,

    /// Status lines of the action history, oldest first.
    #[serde(default)]
    pub committee_referrals: Vec<String>,
}

/// Scope of a bill. The site only ever uses these two literals.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Significance {
    National,
    Local,
}

/// Raised when a significance token is outside the closed vocabulary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown bill significance encountered: {0:?}")]
pub struct UnknownSignificance(pub String);

impl Significance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Significance::National => "NATIONAL",
            Significance::Local => "LOCAL",
        }
    }
}

impl FromStr for Significance {
    type Err = UnknownSignificance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NATIONAL" => Ok(Significance::National),
            "LOCAL" => Ok(Significance::Local),
            other => Err(UnknownSignificance(other.to_string())),
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chamber of Congress a bill was filed in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongressHouse {
    #[default]
    HouseOfRepresentatives,
    Senate,
}

impl CongressHouse {
    pub fn as_str(&self) -> &'static str {
        match self {
            CongressHouse::HouseOfRepresentatives => "HOUSE_OF_REPRESENTATIVES",
            CongressHouse::Senate => "SENATE",
        }
    }
}

impl FromStr for CongressHouse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOUSE_OF_REPRESENTATIVES" => Ok(CongressHouse::HouseOfRepresentatives),
            "SENATE" => Ok(CongressHouse::Senate),
            other => Err(format!("unknown congress house: {}", other)),
        }
    }
}

impl fmt::Display for CongressHouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
