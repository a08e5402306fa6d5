// Deposito - Bank Deposit Management Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod accrual;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;

// Re-export commonly used types
pub use accrual::{accrued_balance, months_between};
pub use db::setup_database;
pub use engine::{deposit, withdraw};
pub use entities::{
    account::{
        create_account, delete_account, get_account, get_account_detail, list_account_details,
        update_account, Account, AccountDetail, AccountUpdate,
    },
    customer::{
        delete_customer, get_customer, get_customer_detail, insert_customer, list_customers,
        update_customer, Customer, CustomerDetail,
    },
    deposito_type::{
        delete_deposito_type, get_deposito_type, insert_deposito_type, list_deposito_types,
        seed_default_types, update_deposito_type, DepositoType, DepositoTypeUpdate,
    },
    transaction::{list_transactions, Transaction, TxKind},
};
pub use error::{DepositoError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database path: `DEPOSITO_DB` env var, or `deposito.db` in the working dir.
pub fn database_path() -> std::path::PathBuf {
    std::env::var_os("DEPOSITO_DB")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("deposito.db"))
}
