//! Extraction orchestrator
//!
//! Two states, one transition: try the AI structuring extractor once under
//! a caller-side deadline; on any transport or extraction failure, run the
//! rule-based parser plus keyword categorizer instead. The two paths are
//! never mixed: a canonical record is entirely AI-produced or entirely
//! rule-produced, which keeps provenance auditable.

use std::time::Duration;

use chrono::Local;
use tracing::{debug, warn};

use crate::ai::GenerativeClient;
use crate::categorize::categorize;
use crate::error::{Error, Result};
use crate::heuristics::{parse_receipt_text, UNKNOWN_MERCHANT};
use crate::models::{
    CanonicalTransaction, ExtractionOutcome, ParsedTransaction, Provenance, StructuredRecord,
};

/// Caller-side ceiling on the backend call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Description assigned when the AI path returns no merchant short name
const DEFAULT_DESCRIPTION: &str = "Transaction";

/// The receipt-text-to-transaction resolution pipeline
#[derive(Clone)]
pub struct ExtractionPipeline {
    client: Option<GenerativeClient>,
    timeout: Duration,
}

impl ExtractionPipeline {
    /// Create a pipeline. Without a client every extraction goes straight
    /// to the rule-based path.
    pub fn new(client: Option<GenerativeClient>) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create from environment variables (AI_BACKEND, GEMINI_*)
    pub fn from_env() -> Self {
        Self::new(GenerativeClient::from_env())
    }

    /// Override the backend deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether an AI backend is configured
    pub fn has_backend(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&GenerativeClient> {
        self.client.as_ref()
    }

    /// Resolve raw OCR text into a canonical transaction.
    ///
    /// Empty input fails immediately with no extraction attempted. Each
    /// extractor is tried at most once per call; there are no retries.
    pub async fn extract(&self, ocr_text: &str) -> Result<ExtractionOutcome> {
        let text = ocr_text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        if let Some(client) = &self.client {
            let attempt = tokio::time::timeout(self.timeout, client.structure_receipt(text))
                .await
                .map_err(|_| Error::Timeout(self.timeout.as_secs()))
                .and_then(|result| result);

            match attempt {
                Ok(record) => {
                    debug!(category = %record.category, "AI extraction succeeded");
                    return Ok(outcome_from_structured(record));
                }
                Err(err) if err.triggers_fallback() => {
                    warn!(error = %err, "AI extraction failed, using rule-based fallback");
                }
                Err(err) => return Err(err),
            }
        } else {
            debug!("No AI backend configured, using rule-based parser");
        }

        Ok(outcome_from_legacy(parse_receipt_text(text)))
    }
}

/// Normalize the AI path output into the canonical shape.
///
/// `in`/`out` remaps to `credit`/`debit`, a missing date becomes the
/// processing day, a missing merchant short name becomes "Transaction".
fn outcome_from_structured(record: StructuredRecord) -> ExtractionOutcome {
    let transaction = CanonicalTransaction {
        date: record.date.unwrap_or_else(|| Local::now().date_naive()),
        description: record
            .sub_category
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        amount: record.amount,
        direction: record.flow.direction(),
        category: record.category.as_str().to_string(),
        notes: record.note,
    };
    ExtractionOutcome {
        transaction,
        provenance: Provenance::Ai,
        degraded: false,
    }
}

/// Normalize the rule-based path output into the canonical shape.
///
/// The degraded flag marks records built from the parser's documented
/// defaults, so callers can tell a best-guess record from a real one.
fn outcome_from_legacy(parsed: ParsedTransaction) -> ExtractionOutcome {
    let degraded = parsed.amount == 0.0 || parsed.description == UNKNOWN_MERCHANT;
    let category = categorize(&parsed.description, parsed.direction);
    let transaction = CanonicalTransaction {
        date: parsed.date,
        description: parsed.description,
        amount: parsed.amount,
        direction: parsed.direction,
        category: category.to_string(),
        notes: None,
    };
    ExtractionOutcome {
        transaction,
        provenance: Provenance::Fallback,
        degraded,
    }
}
