use anyhow::Result;
use malinaw_lib::types::BillHistory;
use malinaw_lib::{DbBillRow, RunSummary};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct BillRow {
    #[tabled(rename = "Bill")]
    #[serde(rename = "Bill")]
    bill_num: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Significance")]
    #[serde(rename = "Significance")]
    significance: String,
    #[tabled(rename = "Filed")]
    #[serde(rename = "Filed")]
    date_filed: String,
    #[tabled(rename = "Actions")]
    #[serde(rename = "Actions")]
    actions: usize,
    #[tabled(rename = "Latest Status")]
    #[serde(rename = "Latest Status")]
    latest_status: String,
}

#[derive(Tabled, Serialize)]
struct StoredBillRow {
    #[tabled(rename = "Congress")]
    #[serde(rename = "Congress")]
    congress: u32,
    #[tabled(rename = "Bill")]
    #[serde(rename = "Bill")]
    bill_num: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Significance")]
    #[serde(rename = "Significance")]
    significance: String,
    #[tabled(rename = "Filed")]
    #[serde(rename = "Filed")]
    date_filed: String,
    #[tabled(rename = "Actions")]
    #[serde(rename = "Actions")]
    actions: i64,
    #[tabled(rename = "Latest Status")]
    #[serde(rename = "Latest Status")]
    latest_status: String,
}

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Attempted")]
    #[serde(rename = "Attempted")]
    attempted: usize,
    #[tabled(rename = "Loaded")]
    #[serde(rename = "Loaded")]
    succeeded: usize,
    #[tabled(rename = "Duplicates")]
    #[serde(rename = "Duplicates")]
    duplicates: usize,
    #[tabled(rename = "Already Stored")]
    #[serde(rename = "Already Stored")]
    already_stored: usize,
    #[tabled(rename = "Failed")]
    #[serde(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Elapsed")]
    #[serde(rename = "Elapsed")]
    elapsed: String,
}

#[derive(Tabled, Serialize)]
struct RowIdRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    position: usize,
    #[tabled(rename = "Row ID")]
    #[serde(rename = "Row ID")]
    row_id: String,
}

// -- Row builders --

fn build_bill_rows(bills: &[BillHistory]) -> Vec<BillRow> {
    bills
        .iter()
        .map(|b| BillRow {
            bill_num: b.bill_num.clone(),
            title: truncate(b.short_title.as_deref().unwrap_or(&b.title), 60),
            significance: b.significance.to_string(),
            date_filed: b.date_filed.clone(),
            actions: b.committee_referrals.len(),
            latest_status: b
                .committee_referrals
                .last()
                .map(|s| truncate(s, 60))
                .unwrap_or_default(),
        })
        .collect()
}

fn build_stored_bill_rows(bills: &[DbBillRow]) -> Vec<StoredBillRow> {
    bills
        .iter()
        .map(|b| StoredBillRow {
            congress: b.congress_num,
            bill_num: b.bill_num.clone(),
            title: truncate(b.short_title.as_deref().unwrap_or(&b.title), 60),
            significance: b.significance.clone(),
            date_filed: b.date_filed.clone(),
            actions: b.referral_count,
            latest_status: b
                .latest_status
                .as_deref()
                .map(|s| truncate(s, 60))
                .unwrap_or_default(),
        })
        .collect()
}

fn build_summary_rows(summary: &RunSummary) -> Vec<SummaryRow> {
    let elapsed = summary.finished_at - summary.started_at;
    vec![SummaryRow {
        attempted: summary.attempted,
        succeeded: summary.succeeded,
        duplicates: summary.duplicates,
        already_stored: summary.already_stored,
        failed: summary.failed,
        elapsed: format!("{}s", elapsed.num_seconds()),
    }]
}

fn build_row_id_rows(row_ids: &[String]) -> Vec<RowIdRow> {
    row_ids
        .iter()
        .enumerate()
        .map(|(i, id)| RowIdRow {
            position: i + 1,
            row_id: id.clone(),
        })
        .collect()
}

// -- Printers --

pub fn print_bills(bills: &[BillHistory], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&bills),
        other => print_rows(build_bill_rows(bills), other)?,
    }
    Ok(())
}

pub fn print_stored_bills(bills: &[DbBillRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&bills),
        other => print_rows(build_stored_bill_rows(bills), other)?,
    }
    Ok(())
}

pub fn print_summary(summary: &RunSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        other => print_rows(build_summary_rows(summary), other)?,
    }
    Ok(())
}

pub fn print_row_ids(row_ids: &[String], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&row_ids),
        other => print_rows(build_row_id_rows(row_ids), other)?,
    }
    Ok(())
}

fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        _ => println!("{}", Table::new(rows)),
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
