//! SQLite storage for parsed bills.

use std::path::Path;

use hrep_api::types::{BillHistory, CongressHouse, Significance};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::pipeline::RunSummary;
use crate::record::BillRecord;

const SCHEMA_VERSION: i32 = 1;
const LAST_RUN_KEY: &str = "last_run";

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bill {bill_num} of congress {congress_num} is already stored")]
    Duplicate { congress_num: u32, bill_num: String },
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

/// Accepts parsed bills for persistence.
///
/// Implementations assign identity and enforce one bill per
/// `(congress, bill number)`.
pub trait BillStore {
    fn insert_bill(&mut self, record: &BillRecord) -> Result<i64, DbError>;
}

pub struct Db {
    conn: Connection,
}

/// Filters for [`Db::query_bills`]. Unset fields match everything.
#[derive(Debug, Default, Clone)]
pub struct BillFilter {
    pub congress_num: Option<u32>,
    pub significance: Option<Significance>,
    /// Substring of the bill number, title, or short title.
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Summary row for listing stored bills.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbBillRow {
    pub bill_id: i64,
    pub congress_num: u32,
    pub bill_num: String,
    pub title: String,
    pub short_title: Option<String>,
    pub date_filed: String,
    pub significance: String,
    pub referral_count: i64,
    pub latest_status: Option<String>,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn record_run(&self, summary: &RunSummary) -> Result<(), DbError> {
        self.set_meta(LAST_RUN_KEY, &serde_json::to_string(summary)?)
    }

    pub fn last_run(&self) -> Result<Option<RunSummary>, DbError> {
        match self.get_meta(LAST_RUN_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn bill_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM bills", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Loads one bill with its referrals in stored order.
    pub fn get_bill(&self, congress_num: u32, bill_num: &str) -> Result<Option<BillRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT bill_id, house, title, short_title, abstract, date_filed,
                        significance, source_url
                 FROM bills WHERE congress_num = ?1 AND bill_num = ?2",
                params![congress_num, bill_num],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((bill_id, house, title, short_title, r#abstract, date_filed, significance, source_url)) =
            row
        else {
            return Ok(None);
        };

        let house: CongressHouse = house.parse().map_err(DbError::InvalidValue)?;
        let significance: Significance = significance
            .parse()
            .map_err(|e: hrep_api::types::UnknownSignificance| DbError::InvalidValue(e.to_string()))?;

        let mut stmt = self.conn.prepare(
            "SELECT status FROM bill_referrals WHERE bill_id = ?1 ORDER BY position",
        )?;
        let committee_referrals = stmt
            .query_map(params![bill_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(BillRecord {
            bill: BillHistory {
                bill_num: bill_num.to_string(),
                title,
                short_title,
                r#abstract,
                date_filed,
                significance,
                committee_referrals,
            },
            congress_num,
            house,
            source_url,
        }))
    }

    /// Lists stored bills, newest insert first.
    pub fn query_bills(&self, filter: &BillFilter) -> Result<Vec<DbBillRow>, DbError> {
        let mut sql = String::from(
            "SELECT b.bill_id, b.congress_num, b.bill_num, b.title, b.short_title,
                    b.date_filed, b.significance,
                    (SELECT COUNT(1) FROM bill_referrals r WHERE r.bill_id = b.bill_id),
                    (SELECT r.status FROM bill_referrals r WHERE r.bill_id = b.bill_id
                     ORDER BY r.position DESC LIMIT 1)
             FROM bills b
             WHERE 1=1",
        );

        let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        let mut param_idx = 1;

        if let Some(congress) = filter.congress_num {
            sql.push_str(&format!(" AND b.congress_num = ?{}", param_idx));
            params_vec.push(Box::new(congress));
            param_idx += 1;
        }
        if let Some(significance) = filter.significance {
            sql.push_str(&format!(" AND b.significance = ?{}", param_idx));
            params_vec.push(Box::new(significance.as_str()));
            param_idx += 1;
        }
        if let Some(ref search) = filter.search {
            sql.push_str(&format!(
                " AND (b.bill_num LIKE ?{n} OR b.title LIKE ?{n} OR b.short_title LIKE ?{n})",
                n = param_idx
            ));
            params_vec.push(Box::new(format!("%{}%", search)));
        }

        sql.push_str(" ORDER BY b.bill_id DESC");

        if let Some(n) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            Ok(DbBillRow {
                bill_id: row.get(0)?,
                congress_num: row.get(1)?,
                bill_num: row.get(2)?,
                title: row.get(3)?,
                short_title: row.get(4)?,
                date_filed: row.get(5)?,
                significance: row.get(6)?,
                referral_count: row.get(7)?,
                latest_status: row.get(8)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

impl BillStore for Db {
    fn insert_bill(&mut self, record: &BillRecord) -> Result<i64, DbError> {
        let bill = &record.bill;
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO bills (congress_num, house, bill_num, title, short_title, abstract,
                                date_filed, significance, source_url, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.congress_num,
                record.house.as_str(),
                bill.bill_num,
                bill.title,
                bill.short_title,
                bill.r#abstract,
                bill.date_filed,
                bill.significance.as_str(),
                record.source_url,
                chrono::Utc::now().to_rfc3339(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(DbError::Duplicate {
                    congress_num: record.congress_num,
                    bill_num: bill.bill_num.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        let bill_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO bill_referrals (bill_id, position, status) VALUES (?1, ?2, ?3)",
            )?;
            for (position, status) in bill.committee_referrals.iter().enumerate() {
                stmt.execute(params![bill_id, position as i64, status])?;
            }
        }

        tx.commit()?;
        Ok(bill_id)
    }
}
