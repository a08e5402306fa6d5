// Account entity - a deposito held by one customer under one product.
//
// `balance` is a cached snapshot. The authoritative withdrawable value is
// recomputed from (deposit_date, yearly_return, balance, withdrawal date)
// inside the engine whenever a withdrawal is evaluated.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{date_from_row, date_to_sql, decimal_from_row, timestamp_from_row};
use crate::entities::customer::{self, Customer};
use crate::entities::deposito_type::{self, DepositoType};
use crate::entities::transaction::{self, Transaction};
use crate::error::{DepositoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub customer_id: i64,
    pub deposito_type_id: i64,
    pub balance: Decimal,
    /// Date of the first deposit ever made on the account; set exactly once.
    pub deposit_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account joined with its customer, product, and full ledger (newest first).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    pub customer: Customer,
    pub deposito_type: DepositoType,
    pub transactions: Vec<Transaction>,
}

/// Partial update payload; None leaves the field unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub deposito_type_id: Option<i64>,
    pub balance: Option<Decimal>,
}

fn map_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        deposito_type_id: row.get(2)?,
        balance: decimal_from_row(row, 3)?,
        deposit_date: date_from_row(row, 4)?,
        created_at: timestamp_from_row(row, 5)?,
        updated_at: timestamp_from_row(row, 6)?,
    })
}

const SELECT_ACCOUNT: &str = "SELECT id, customer_id, deposito_type_id, balance, deposit_date,
        created_at, updated_at
 FROM accounts";

/// Create an account with an optional initial balance (defaults to zero) and
/// no deposit date. Both referenced entities must exist.
pub fn create_account(
    conn: &Connection,
    customer_id: i64,
    deposito_type_id: i64,
    initial_balance: Option<Decimal>,
) -> Result<Account> {
    let balance = initial_balance.unwrap_or(Decimal::ZERO);
    if balance < Decimal::ZERO {
        return Err(DepositoError::validation("initial balance must not be negative"));
    }

    customer::get_customer(conn, customer_id)?
        .ok_or_else(|| DepositoError::not_found("customer", customer_id))?;
    deposito_type::get_deposito_type(conn, deposito_type_id)?
        .ok_or_else(|| DepositoError::not_found("deposito type", deposito_type_id))?;

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO accounts (customer_id, deposito_type_id, balance, deposit_date,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
        params![customer_id, deposito_type_id, balance.to_string(), now],
    )?;

    let id = conn.last_insert_rowid();
    get_account(conn, id)?.ok_or_else(|| DepositoError::not_found("account", id))
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ACCOUNT} WHERE id = ?1"))?;
    let account = stmt.query_row(params![id], map_row).optional()?;
    Ok(account)
}

/// Account with joined customer, deposito type, and ledger, or None.
pub fn get_account_detail(conn: &Connection, id: i64) -> Result<Option<AccountDetail>> {
    let Some(account) = get_account(conn, id)? else {
        return Ok(None);
    };
    load_detail(conn, account).map(Some)
}

/// All accounts as joined details, newest first.
pub fn list_account_details(conn: &Connection) -> Result<Vec<AccountDetail>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ACCOUNT} ORDER BY created_at DESC, id DESC"))?;
    let accounts = stmt
        .query_map([], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    accounts
        .into_iter()
        .map(|account| load_detail(conn, account))
        .collect()
}

/// Accounts owned by one customer, newest first.
pub fn list_account_details_for_customer(
    conn: &Connection,
    customer_id: i64,
) -> Result<Vec<AccountDetail>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_ACCOUNT} WHERE customer_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let accounts = stmt
        .query_map(params![customer_id], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    accounts
        .into_iter()
        .map(|account| load_detail(conn, account))
        .collect()
}

fn load_detail(conn: &Connection, account: Account) -> Result<AccountDetail> {
    let customer = customer::get_customer(conn, account.customer_id)?
        .ok_or_else(|| DepositoError::not_found("customer", account.customer_id))?;
    let deposito_type = deposito_type::get_deposito_type(conn, account.deposito_type_id)?
        .ok_or_else(|| DepositoError::not_found("deposito type", account.deposito_type_id))?;
    let transactions = transaction::list_transactions(conn, account.id)?;

    Ok(AccountDetail {
        account,
        customer,
        deposito_type,
        transactions,
    })
}

/// Update the mutable administrative fields (product, stored balance).
pub fn update_account(conn: &Connection, id: i64, update: &AccountUpdate) -> Result<Account> {
    let current = get_account(conn, id)?.ok_or_else(|| DepositoError::not_found("account", id))?;

    let deposito_type_id = update.deposito_type_id.unwrap_or(current.deposito_type_id);
    if deposito_type_id != current.deposito_type_id {
        deposito_type::get_deposito_type(conn, deposito_type_id)?
            .ok_or_else(|| DepositoError::not_found("deposito type", deposito_type_id))?;
    }

    let balance = update.balance.unwrap_or(current.balance);
    if balance < Decimal::ZERO {
        return Err(DepositoError::validation("balance must not be negative"));
    }

    conn.execute(
        "UPDATE accounts SET deposito_type_id = ?1, balance = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            deposito_type_id,
            balance.to_string(),
            Utc::now().to_rfc3339(),
            id
        ],
    )?;

    get_account(conn, id)?.ok_or_else(|| DepositoError::not_found("account", id))
}

pub fn delete_account(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DepositoError::not_found("account", id));
    }
    Ok(())
}

/// Engine-internal balance write. `deposit_date` is stored as given: the
/// engine passes the existing date through unchanged on withdrawals and only
/// fills it on an account's first deposit.
pub(crate) fn set_balance(
    conn: &Connection,
    id: i64,
    balance: Decimal,
    deposit_date: Option<NaiveDate>,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE accounts SET balance = ?1, deposit_date = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            balance.to_string(),
            deposit_date.map(date_to_sql),
            Utc::now().to_rfc3339(),
            id
        ],
    )?;

    if updated == 0 {
        return Err(DepositoError::not_found("account", id));
    }
    Ok(())
}
