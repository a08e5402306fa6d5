// Transaction entity - append-only ledger entry for an account.
// Rows are never updated; they only disappear via account cascade delete.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{date_to_sql, decimal_from_row, timestamp_from_row, DATE_FMT};
use crate::error::{DepositoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    Deposit,
    Withdraw,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "DEPOSIT",
            TxKind::Withdraw => "WITHDRAW",
        }
    }

    fn from_sql(text: &str, idx: usize) -> rusqlite::Result<Self> {
        match text {
            "DEPOSIT" => Ok(TxKind::Deposit),
            "WITHDRAW" => Ok(TxKind::Withdraw),
            other => Err(rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("unknown transaction kind: {other}").into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

fn map_row(row: &Row) -> rusqlite::Result<Transaction> {
    let kind_text: String = row.get(2)?;
    let date_text: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        kind: TxKind::from_sql(&kind_text, 2)?,
        amount: decimal_from_row(row, 3)?,
        date: NaiveDate::parse_from_str(&date_text, DATE_FMT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        created_at: timestamp_from_row(row, 5)?,
    })
}

/// Append a ledger entry. Amounts must be strictly positive for both kinds.
pub fn insert_transaction(
    conn: &Connection,
    account_id: i64,
    kind: TxKind,
    amount: Decimal,
    date: NaiveDate,
) -> Result<Transaction> {
    if amount <= Decimal::ZERO {
        return Err(DepositoError::validation("amount must be positive"));
    }

    conn.execute(
        "INSERT INTO transactions (account_id, kind, amount, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account_id,
            kind.as_str(),
            amount.to_string(),
            date_to_sql(date),
            Utc::now().to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    let mut stmt = conn.prepare(
        "SELECT id, account_id, kind, amount, date, created_at
         FROM transactions WHERE id = ?1",
    )?;
    let transaction = stmt.query_row(params![id], map_row)?;

    Ok(transaction)
}

/// Ledger for one account, newest first (id breaks ties within a date).
pub fn list_transactions(conn: &Connection, account_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, kind, amount, date, created_at
         FROM transactions
         WHERE account_id = ?1
         ORDER BY date DESC, id DESC",
    )?;

    let transactions = stmt
        .query_map(params![account_id], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_connection;
    use crate::entities::{account, customer, deposito_type};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_account(conn: &Connection) -> i64 {
        let c = customer::insert_customer(conn, "Alice").unwrap();
        let t = deposito_type::insert_deposito_type(conn, "Silver", dec!(0.05)).unwrap();
        account::create_account(conn, c.id, t.id, None).unwrap().id
    }

    #[test]
    fn test_insert_transaction() {
        let conn = test_connection();
        let account_id = seeded_account(&conn);

        let tx = insert_transaction(&conn, account_id, TxKind::Deposit, dec!(100.50), date(2024, 3, 10))
            .unwrap();
        assert_eq!(tx.account_id, account_id);
        assert_eq!(tx.kind, TxKind::Deposit);
        assert_eq!(tx.amount, dec!(100.50));
        assert_eq!(tx.date, date(2024, 3, 10));
    }

    #[test]
    fn test_insert_rejects_non_positive_amount() {
        let conn = test_connection();
        let account_id = seeded_account(&conn);

        let zero = insert_transaction(&conn, account_id, TxKind::Deposit, dec!(0), date(2024, 1, 1));
        assert!(matches!(zero, Err(DepositoError::Validation(_))));

        let negative =
            insert_transaction(&conn, account_id, TxKind::Withdraw, dec!(-5), date(2024, 1, 1));
        assert!(matches!(negative, Err(DepositoError::Validation(_))));
    }

    #[test]
    fn test_list_transactions_newest_first() {
        let conn = test_connection();
        let account_id = seeded_account(&conn);

        insert_transaction(&conn, account_id, TxKind::Deposit, dec!(100), date(2024, 1, 15)).unwrap();
        insert_transaction(&conn, account_id, TxKind::Deposit, dec!(200), date(2024, 3, 1)).unwrap();
        insert_transaction(&conn, account_id, TxKind::Withdraw, dec!(50), date(2024, 2, 10)).unwrap();

        let ledger = list_transactions(&conn, account_id).unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[0].date, date(2024, 3, 1));
        assert_eq!(ledger[1].date, date(2024, 2, 10));
        assert_eq!(ledger[2].date, date(2024, 1, 15));
    }

    #[test]
    fn test_same_date_breaks_ties_by_recency() {
        let conn = test_connection();
        let account_id = seeded_account(&conn);

        insert_transaction(&conn, account_id, TxKind::Deposit, dec!(1), date(2024, 5, 5)).unwrap();
        insert_transaction(&conn, account_id, TxKind::Deposit, dec!(2), date(2024, 5, 5)).unwrap();

        let ledger = list_transactions(&conn, account_id).unwrap();
        assert_eq!(ledger[0].amount, dec!(2));
        assert_eq!(ledger[1].amount, dec!(1));
    }
}
