//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database and backend status

use std::path::Path;

use anyhow::{Context, Result};
use snapledger_core::db::Database;
use snapledger_core::{GenerativeBackend, GenerativeClient};

/// Open the database, creating it if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("Database initialized successfully.");
    println!();
    println!("Next steps:");
    println!("  1. Extract a receipt: snapledger extract --file receipt.txt");
    println!("  2. Start the API:     snapledger serve");
    println!();
    println!("Set GEMINI_API_KEY to enable the AI extraction path;");
    println!("without it every receipt goes through the rule-based parser.");

    Ok(())
}

pub async fn cmd_status(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;

    println!("Database:   {}", db.path());
    println!("  healthy:  {}", db.health_check());
    println!("  stored:   {} transactions", db.transaction_count()?);

    match GenerativeClient::from_env() {
        Some(client) => {
            let reachable = client.health_check().await;
            println!("AI backend: {} ({})", client.host(), client.model());
            println!("  reachable: {}", reachable);
        }
        None => {
            println!("AI backend: not configured (set GEMINI_API_KEY)");
            println!("  extraction uses the rule-based parser only");
        }
    }

    Ok(())
}
