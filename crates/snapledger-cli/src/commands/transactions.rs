//! Transactions listing command

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub fn cmd_transactions_list(db_path: &Path, user: &str, limit: i64) -> Result<()> {
    let db = open_db(db_path)?;
    let transactions = db.list_transactions(user, limit)?;

    if transactions.is_empty() {
        println!("No transactions stored for user '{}'.", user);
        return Ok(());
    }

    println!(
        "{:<5} {:<12} {:<28} {:>10}  {:<7} {:<15} {}",
        "ID", "DATE", "DESCRIPTION", "AMOUNT", "TYPE", "CATEGORY", "SOURCE"
    );
    for tx in &transactions {
        println!(
            "{:<5} {:<12} {:<28} {:>10.2}  {:<7} {:<15} {}",
            tx.id,
            tx.date.to_string(),
            truncate(&tx.description, 28),
            tx.amount,
            tx.direction.as_str(),
            truncate(&tx.category, 15),
            tx.provenance.as_str(),
        );
    }
    println!("{} transaction(s)", transactions.len());

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
