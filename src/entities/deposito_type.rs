// Deposito type entity - a deposit product with a fixed yearly return.
//
// The yearly return is fractional: 0.05 means 5% per year. Products are
// editable, but deletion is rejected while any account still references one.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::db::{decimal_from_row, timestamp_from_row};
use crate::error::{DepositoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositoType {
    pub id: i64,
    pub name: String,
    pub yearly_return: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload; None leaves the field unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositoTypeUpdate {
    pub name: Option<String>,
    pub yearly_return: Option<Decimal>,
}

fn map_row(row: &Row) -> rusqlite::Result<DepositoType> {
    Ok(DepositoType {
        id: row.get(0)?,
        name: row.get(1)?,
        yearly_return: decimal_from_row(row, 2)?,
        created_at: timestamp_from_row(row, 3)?,
        updated_at: timestamp_from_row(row, 4)?,
    })
}

fn validate(name: Option<&str>, yearly_return: Option<Decimal>) -> Result<()> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(DepositoError::validation("deposito type name is required"));
        }
    }
    if let Some(rate) = yearly_return {
        if rate < Decimal::ZERO {
            return Err(DepositoError::validation("yearly return must not be negative"));
        }
    }
    Ok(())
}

pub fn insert_deposito_type(
    conn: &Connection,
    name: &str,
    yearly_return: Decimal,
) -> Result<DepositoType> {
    validate(Some(name), Some(yearly_return))?;

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO deposito_types (name, yearly_return, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)",
        params![name, yearly_return.to_string(), now],
    )?;

    let id = conn.last_insert_rowid();
    get_deposito_type(conn, id)?.ok_or_else(|| DepositoError::not_found("deposito type", id))
}

pub fn get_deposito_type(conn: &Connection, id: i64) -> Result<Option<DepositoType>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, yearly_return, created_at, updated_at
         FROM deposito_types WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id], map_row)?;
    match rows.next() {
        Some(deposito_type) => Ok(Some(deposito_type?)),
        None => Ok(None),
    }
}

/// All deposito types, newest first.
pub fn list_deposito_types(conn: &Connection) -> Result<Vec<DepositoType>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, yearly_return, created_at, updated_at
         FROM deposito_types
         ORDER BY created_at DESC, id DESC",
    )?;

    let types = stmt
        .query_map([], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(types)
}

pub fn update_deposito_type(
    conn: &Connection,
    id: i64,
    update: &DepositoTypeUpdate,
) -> Result<DepositoType> {
    validate(update.name.as_deref(), update.yearly_return)?;

    let current =
        get_deposito_type(conn, id)?.ok_or_else(|| DepositoError::not_found("deposito type", id))?;

    let name = update.name.as_deref().unwrap_or(&current.name);
    let yearly_return = update.yearly_return.unwrap_or(current.yearly_return);

    conn.execute(
        "UPDATE deposito_types SET name = ?1, yearly_return = ?2, updated_at = ?3 WHERE id = ?4",
        params![name, yearly_return.to_string(), Utc::now().to_rfc3339(), id],
    )?;

    get_deposito_type(conn, id)?.ok_or_else(|| DepositoError::not_found("deposito type", id))
}

pub fn delete_deposito_type(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM deposito_types WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DepositoError::not_found("deposito type", id));
    }
    Ok(())
}

/// Seed the default deposit products. Upserts by name, so re-running is safe.
pub fn seed_default_types(conn: &Connection) -> Result<usize> {
    let defaults = [
        ("Deposito Bronze", dec!(0.03)),
        ("Deposito Silver", dec!(0.05)),
        ("Deposito Gold", dec!(0.07)),
    ];

    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for (name, yearly_return) in defaults {
        inserted += conn.execute(
            "INSERT INTO deposito_types (name, yearly_return, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(name) DO NOTHING",
            params![name, yearly_return.to_string(), now],
        )?;
    }

    Ok(inserted)
}
