// Deposito error taxonomy
// Every failure aborts the current operation with the account unchanged.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepositoError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("no deposit date found for this account")]
    NoDepositDate,

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl DepositoError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DepositoError::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DepositoError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DepositoError>;
