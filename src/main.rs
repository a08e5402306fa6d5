use anyhow::Result;
use rusqlite::Connection;
use std::env;

use deposito::{database_path, list_account_details, list_customers, seed_default_types, setup_database};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init()?,
        _ => run_summary()?,
    }

    Ok(())
}

fn run_init() -> Result<()> {
    println!("🏦 Deposito - Database Setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = database_path();
    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode: {:?}", db_path);

    let seeded = seed_default_types(&conn)?;
    if seeded > 0 {
        println!("✓ Seeded {} default deposito types (Bronze, Silver, Gold)", seeded);
    } else {
        println!("✓ Default deposito types already present");
    }

    Ok(())
}

fn run_summary() -> Result<()> {
    let db_path = database_path();

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: deposito init");
        std::process::exit(1);
    }

    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;

    let customers = list_customers(&conn)?;
    let accounts = list_account_details(&conn)?;

    println!("🏦 Deposito - Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━");
    println!("Customers: {}", customers.len());
    println!("Accounts:  {}", accounts.len());

    for detail in &accounts {
        let deposit_date = detail
            .account
            .deposit_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  #{:<4} {:<20} {:<18} balance {:>14}  first deposit {}",
            detail.account.id,
            detail.customer.name,
            detail.deposito_type.name,
            detail.account.balance,
            deposit_date,
        );
    }

    Ok(())
}
