//! Serve command

use std::path::Path;

use anyhow::Result;
use snapledger_core::GenerativeClient;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16) -> Result<()> {
    let db = open_db(db_path)?;
    let client = GenerativeClient::from_env();

    println!("Starting snapledger server on http://{}:{}", host, port);
    if client.is_none() {
        println!("AI backend not configured; extraction will use the rule-based parser");
    }

    let router = snapledger_server::create_router(db, client);
    snapledger_server::serve(router, host, port).await
}
