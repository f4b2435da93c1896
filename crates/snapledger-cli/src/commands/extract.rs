//! Extract command

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use snapledger_core::models::ExtractionOutcome;
use snapledger_core::{content_hash, ExtractionPipeline, NewTransaction};

use super::open_db;

pub async fn cmd_extract(
    db_path: &Path,
    file: Option<&Path>,
    user: &str,
    no_save: bool,
    json: bool,
) -> Result<()> {
    let text = read_input(file)?;

    let pipeline = ExtractionPipeline::from_env();
    let outcome = pipeline
        .extract(&text)
        .await
        .context("Extraction failed")?;

    let saved_id = if no_save {
        None
    } else {
        let db = open_db(db_path)?;
        let hash = content_hash(user, text.trim());
        let result = db.insert_transaction(user, &NewTransaction::from_outcome(&outcome, Some(hash)))?;
        if result.is_duplicate() {
            println!("Already stored as transaction #{}", result.id());
        }
        Some(result.id())
    };

    if json {
        let mut value = serde_json::to_value(&outcome)?;
        if let Some(id) = saved_id {
            value["id"] = serde_json::json!(id);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_outcome(&outcome);
    if let Some(id) = saved_id {
        println!("Saved as transaction #{}", id);
    }

    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    Ok(text)
}

fn print_outcome(outcome: &ExtractionOutcome) {
    let tx = &outcome.transaction;
    println!("Date:        {}", tx.date);
    println!("Description: {}", tx.description);
    println!("Amount:      {:.2} ({})", tx.amount, tx.direction);
    println!("Category:    {}", tx.category);
    if let Some(notes) = &tx.notes {
        println!("Notes:       {}", notes);
    }
    println!("Provenance:  {}", outcome.provenance);
    if outcome.degraded {
        println!("Warning: best-guess defaults were used; review before trusting");
    }
}
