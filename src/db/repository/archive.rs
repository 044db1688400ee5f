//! Completed-verification archive.
//!
//! Append-only: records are inserted once, inside a transaction, and never
//! updated. The full record travels as a JSON payload; summary columns
//! back the admin listing and statistics.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One row of the admin investor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedSummary {
    pub id: Uuid,
    pub full_name: String,
    pub country: String,
    pub kyc_status: StageStatus,
    pub accreditation_status: StageStatus,
    pub aml_status: StageStatus,
    pub funds_status: StageStatus,
    pub investment_amount: u64,
    pub completed_at: NaiveDateTime,
}

/// Aggregate figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub total_investors: u64,
    pub accredited_investors: u64,
    /// Summed in Rust; an `i64` SQL `SUM` can overflow.
    pub total_investment: u128,
    pub aml_flagged: u64,
}

struct SummaryRow {
    id: String,
    full_name: String,
    country: String,
    kyc_status: String,
    accreditation_status: String,
    aml_status: String,
    funds_status: String,
    investment_amount: i64,
    completed_at: String,
}

/// Append a completed record. A second insert for the same id is a
/// constraint violation; nothing is written in that case.
pub fn insert_archived(conn: &Connection, archived: &ArchivedRecord) -> Result<(), DatabaseError> {
    let payload = serde_json::to_string(archived)?;
    let stages = &archived.record.stages;
    let amount = i64::try_from(archived.investment_amount()).map_err(|_| DatabaseError::OutOfRange {
        field: "archived_investors.investment_amount".into(),
        value: archived.investment_amount().to_string(),
    })?;

    let tx = conn.unchecked_transaction()?;
    let result = tx.execute(
        "INSERT INTO archived_investors (id, full_name, country, kyc_status,
         accreditation_status, aml_status, funds_status, investment_amount,
         completed_at, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            archived.record.id.to_string(),
            archived.full_name(),
            archived.country(),
            stages.kyc.as_str(),
            stages.accreditation.as_str(),
            stages.aml.as_str(),
            stages.funds.as_str(),
            amount,
            archived.completed_at.format(TIMESTAMP_FORMAT).to_string(),
            payload,
        ],
    );

    match result {
        Ok(_) => {
            tx.commit()?;
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(DatabaseError::ConstraintViolation(format!(
                "investor {} is already archived",
                archived.record.id
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_archived(conn: &Connection, id: &Uuid) -> Result<Option<ArchivedRecord>, DatabaseError> {
    let result = conn.query_row(
        "SELECT payload FROM archived_investors WHERE id = ?1",
        params![id.to_string()],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(payload) => Ok(Some(serde_json::from_str(&payload)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All archived investors, most recently completed first.
pub fn list_archived(conn: &Connection) -> Result<Vec<ArchivedSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, country, kyc_status, accreditation_status, aml_status,
         funds_status, investment_amount, completed_at
         FROM archived_investors ORDER BY completed_at DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(SummaryRow {
            id: row.get(0)?,
            full_name: row.get(1)?,
            country: row.get(2)?,
            kyc_status: row.get(3)?,
            accreditation_status: row.get(4)?,
            aml_status: row.get(5)?,
            funds_status: row.get(6)?,
            investment_amount: row.get(7)?,
            completed_at: row.get(8)?,
        })
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        summaries.push(summary_from_row(row?)?);
    }
    Ok(summaries)
}

pub fn archive_stats(conn: &Connection) -> Result<ArchiveStats, DatabaseError> {
    let (total, accredited, flagged) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN accreditation_status = 'verified' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN aml_status = 'flagged' THEN 1 ELSE 0 END), 0)
         FROM archived_investors",
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
    )?;

    let mut stmt = conn.prepare("SELECT investment_amount FROM archived_investors")?;
    let amounts = stmt.query_map([], |row| row.get::<_, i64>(0))?;
    let mut total_investment: u128 = 0;
    for amount in amounts {
        total_investment += u128::from(non_negative("investment_amount", amount?)?);
    }

    Ok(ArchiveStats {
        total_investors: non_negative("total_investors", total)?,
        accredited_investors: non_negative("accredited_investors", accredited)?,
        total_investment,
        aml_flagged: non_negative("aml_flagged", flagged)?,
    })
}

fn non_negative(field: &str, value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value).map_err(|_| DatabaseError::OutOfRange {
        field: field.into(),
        value: value.to_string(),
    })
}

fn summary_from_row(row: SummaryRow) -> Result<ArchivedSummary, DatabaseError> {
    let id = Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidEnum {
        field: "archived_investors.id".into(),
        value: row.id.clone(),
    })?;
    let completed_at = NaiveDateTime::parse_from_str(&row.completed_at, TIMESTAMP_FORMAT)
        .map_err(|_| DatabaseError::InvalidEnum {
            field: "archived_investors.completed_at".into(),
            value: row.completed_at.clone(),
        })?;

    Ok(ArchivedSummary {
        id,
        full_name: row.full_name,
        country: row.country,
        kyc_status: StageStatus::from_str(&row.kyc_status)?,
        accreditation_status: StageStatus::from_str(&row.accreditation_status)?,
        aml_status: StageStatus::from_str(&row.aml_status)?,
        funds_status: StageStatus::from_str(&row.funds_status)?,
        investment_amount: non_negative("investment_amount", row.investment_amount)?,
        completed_at,
    })
}
