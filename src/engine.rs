// Deposit & withdrawal engine
//
// Both operations run as a single SQLite transaction taken with IMMEDIATE
// behavior, so the read-compute-write sequence for an account is serialized
// against other writers and either commits whole or leaves no trace.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;

use crate::accrual::{accrued_balance, months_between};
use crate::entities::account::{self, AccountDetail};
use crate::entities::deposito_type;
use crate::entities::transaction::{self, TxKind};
use crate::error::{DepositoError, Result};

/// Append a DEPOSIT transaction and grow the stored balance.
///
/// The first deposit on an account also sets its deposit date; later deposits
/// leave it untouched. No accrual is applied here: interest is computed
/// lazily, only when a withdrawal is evaluated.
pub fn deposit(
    conn: &mut Connection,
    account_id: i64,
    amount: Decimal,
    date: NaiveDate,
) -> Result<AccountDetail> {
    if amount <= Decimal::ZERO {
        return Err(DepositoError::validation("amount must be positive"));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let acc = account::get_account(&tx, account_id)?
        .ok_or_else(|| DepositoError::not_found("account", account_id))?;

    transaction::insert_transaction(&tx, account_id, TxKind::Deposit, amount, date)?;

    let new_balance = acc.balance + amount;
    let deposit_date = acc.deposit_date.unwrap_or(date);
    account::set_balance(&tx, account_id, new_balance, Some(deposit_date))?;

    let detail = account::get_account_detail(&tx, account_id)?
        .ok_or_else(|| DepositoError::not_found("account", account_id))?;

    tx.commit()?;
    Ok(detail)
}

/// Validate a withdrawal against the accrued balance and apply it.
///
/// The accrued balance is simple monthly interest on the currently stored
/// balance, measured in whole months from the account's first deposit date.
/// On success the stored balance becomes `accrued - amount` while the deposit
/// date stays fixed, so a later withdrawal re-accrues over the entire elapsed
/// time against the new principal. That episode-compounding is the product's
/// defined behavior and is kept as is.
pub fn withdraw(
    conn: &mut Connection,
    account_id: i64,
    amount: Decimal,
    date: NaiveDate,
) -> Result<AccountDetail> {
    if amount <= Decimal::ZERO {
        return Err(DepositoError::validation("amount must be positive"));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let acc = account::get_account(&tx, account_id)?
        .ok_or_else(|| DepositoError::not_found("account", account_id))?;

    let deposit_date = acc.deposit_date.ok_or(DepositoError::NoDepositDate)?;

    let product = deposito_type::get_deposito_type(&tx, acc.deposito_type_id)?
        .ok_or_else(|| DepositoError::not_found("deposito type", acc.deposito_type_id))?;

    let months = months_between(deposit_date, date);
    let accrued = accrued_balance(acc.balance, product.yearly_return, months);

    if amount > accrued {
        return Err(DepositoError::InsufficientBalance {
            requested: amount,
            available: accrued,
        });
    }

    transaction::insert_transaction(&tx, account_id, TxKind::Withdraw, amount, date)?;
    account::set_balance(&tx, account_id, accrued - amount, acc.deposit_date)?;

    let detail = account::get_account_detail(&tx, account_id)?
        .ok_or_else(|| DepositoError::not_found("account", account_id))?;

    tx.commit()?;
    Ok(detail)
}
