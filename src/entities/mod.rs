// Entity modules: one per table, each owning its struct, row mapping,
// and CRUD query functions over a rusqlite Connection.

pub mod account;
pub mod customer;
pub mod deposito_type;
pub mod transaction;

pub use account::{Account, AccountDetail, AccountUpdate};
pub use customer::{Customer, CustomerDetail};
pub use deposito_type::{DepositoType, DepositoTypeUpdate};
pub use transaction::{Transaction, TxKind};
