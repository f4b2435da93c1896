//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// snapledger - Turn receipt photos into ledger entries
#[derive(Parser)]
#[command(name = "snapledger")]
#[command(about = "Receipt OCR text to transaction extraction", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "snapledger.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Extract a transaction from OCR text
    Extract {
        /// File containing raw OCR text (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Owning user identifier
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Do not persist the extracted transaction
        #[arg(long)]
        no_save: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored transactions
    Transactions {
        /// Owning user identifier
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Maximum number of rows
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show database and AI backend status
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
