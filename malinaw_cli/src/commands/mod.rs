//! CLI subcommand implementations.

pub mod bills;
pub mod parse;
pub mod row_ids;
pub mod scrape;
pub mod upload;
