//! snapledger CLI - Receipt text to transaction extraction
//!
//! Usage:
//!   snapledger init                   Initialize database
//!   snapledger extract --file TXT     Extract a transaction from OCR text
//!   snapledger transactions           List stored transactions
//!   snapledger status                 Show database and backend status
//!   snapledger serve --port 3000      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Extract {
            file,
            user,
            no_save,
            json,
        } => commands::cmd_extract(&cli.db, file.as_deref(), &user, no_save, json).await,
        Commands::Transactions { user, limit } => {
            commands::cmd_transactions_list(&cli.db, &user, limit)
        }
        Commands::Status => commands::cmd_status(&cli.db).await,
        Commands::Serve { port, host } => commands::cmd_serve(&cli.db, &host, port).await,
    }
}
