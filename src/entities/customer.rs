// Customer entity - owns zero or more deposito accounts.
// Deleting a customer cascades to their accounts and transactions.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::timestamp_from_row;
use crate::entities::account::{self, AccountDetail};
use crate::error::{DepositoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer joined with their accounts (each carrying its deposito type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub accounts: Vec<AccountDetail>,
}

fn map_row(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp_from_row(row, 2)?,
        updated_at: timestamp_from_row(row, 3)?,
    })
}

pub fn insert_customer(conn: &Connection, name: &str) -> Result<Customer> {
    if name.trim().is_empty() {
        return Err(DepositoError::validation("customer name is required"));
    }

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO customers (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![name, now],
    )?;

    let id = conn.last_insert_rowid();
    get_customer(conn, id)?.ok_or_else(|| DepositoError::not_found("customer", id))
}

pub fn get_customer(conn: &Connection, id: i64) -> Result<Option<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at FROM customers WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id], map_row)?;
    match rows.next() {
        Some(customer) => Ok(Some(customer?)),
        None => Ok(None),
    }
}

/// Customer with their accounts, or None if the id is unknown.
pub fn get_customer_detail(conn: &Connection, id: i64) -> Result<Option<CustomerDetail>> {
    let Some(customer) = get_customer(conn, id)? else {
        return Ok(None);
    };

    let accounts = account::list_account_details_for_customer(conn, id)?;
    Ok(Some(CustomerDetail { customer, accounts }))
}

/// All customers, newest first.
pub fn list_customers(conn: &Connection) -> Result<Vec<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at FROM customers
         ORDER BY created_at DESC, id DESC",
    )?;

    let customers = stmt
        .query_map([], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(customers)
}

pub fn update_customer(conn: &Connection, id: i64, name: &str) -> Result<Customer> {
    if name.trim().is_empty() {
        return Err(DepositoError::validation("customer name is required"));
    }

    let updated = conn.execute(
        "UPDATE customers SET name = ?1, updated_at = ?2 WHERE id = ?3",
        params![name, Utc::now().to_rfc3339(), id],
    )?;

    if updated == 0 {
        return Err(DepositoError::not_found("customer", id));
    }

    get_customer(conn, id)?.ok_or_else(|| DepositoError::not_found("customer", id))
}

pub fn delete_customer(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DepositoError::not_found("customer", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_connection;

    #[test]
    fn test_insert_and_get_customer() {
        let conn = test_connection();

        let customer = insert_customer(&conn, "Alice").unwrap();
        assert_eq!(customer.name, "Alice");
        assert!(customer.id > 0);

        let fetched = get_customer(&conn, customer.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.id, customer.id);
    }

    #[test]
    fn test_insert_customer_rejects_blank_name() {
        let conn = test_connection();

        let result = insert_customer(&conn, "   ");
        assert!(matches!(result, Err(DepositoError::Validation(_))));
    }

    #[test]
    fn test_get_unknown_customer_is_none() {
        let conn = test_connection();
        assert!(get_customer(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_update_customer() {
        let conn = test_connection();

        let customer = insert_customer(&conn, "Alice").unwrap();
        let updated = update_customer(&conn, customer.id, "Alice B.").unwrap();
        assert_eq!(updated.name, "Alice B.");

        let missing = update_customer(&conn, 999, "Nobody");
        assert!(matches!(missing, Err(DepositoError::NotFound { .. })));
    }

    #[test]
    fn test_delete_customer() {
        let conn = test_connection();

        let customer = insert_customer(&conn, "Alice").unwrap();
        delete_customer(&conn, customer.id).unwrap();
        assert!(get_customer(&conn, customer.id).unwrap().is_none());

        let missing = delete_customer(&conn, customer.id);
        assert!(matches!(missing, Err(DepositoError::NotFound { .. })));
    }

    #[test]
    fn test_list_customers_newest_first() {
        let conn = test_connection();

        // Fixed timestamps so the ordering is deterministic
        conn.execute(
            "INSERT INTO customers (name, created_at, updated_at)
             VALUES ('Old', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO customers (name, created_at, updated_at)
             VALUES ('New', '2024-06-01T00:00:00+00:00', '2024-06-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

        let customers = list_customers(&conn).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "New");
        assert_eq!(customers[1].name, "Old");
    }
}
