use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Date format for business dates (transaction dates, deposit dates).
pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Cascade deletes depend on this pragma being on for every connection
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Customers
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Deposito types (deposit products with a fixed yearly return)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS deposito_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            yearly_return TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Accounts
    // deposit_date is NULL until the first deposit and never changes afterwards
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL
                REFERENCES customers(id) ON DELETE CASCADE,
            deposito_type_id INTEGER NOT NULL
                REFERENCES deposito_types(id) ON DELETE RESTRICT,
            balance TEXT NOT NULL,
            deposit_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Transactions (append-only ledger)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL
                REFERENCES accounts(id) ON DELETE CASCADE,
            kind TEXT NOT NULL CHECK (kind IN ('DEPOSIT', 'WITHDRAW')),
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_customer ON accounts(customer_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id, date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// SQL value helpers
// Money and dates are stored as TEXT; these keep the row-mapping closures flat.
// ============================================================================

pub(crate) fn decimal_from_row(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn date_from_row(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    match text {
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FMT)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

pub(crate) fn timestamp_from_row(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_connection();
        setup_database(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('customers', 'deposito_types', 'accounts', 'transactions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_transaction_kind_is_constrained() {
        let conn = test_connection();
        conn.execute(
            "INSERT INTO customers (name, created_at, updated_at) VALUES ('c', 't', 't')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO deposito_types (name, yearly_return, created_at, updated_at)
             VALUES ('d', '0.05', 't', 't')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO accounts (customer_id, deposito_type_id, balance, created_at, updated_at)
             VALUES (1, 1, '0', 't', 't')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO transactions (account_id, kind, amount, date, created_at)
             VALUES (1, 'TRANSFER', '10', '2024-01-01', 't')",
            [],
        );
        assert!(result.is_err());
    }
}
