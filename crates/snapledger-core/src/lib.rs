//! snapledger Core Library
//!
//! Shared functionality for the snapledger receipt capture tool:
//! - The receipt-text-to-transaction resolution pipeline: AI structuring
//!   extractor with a deterministic rule-based fallback
//! - Keyword categorizer for the fallback path
//! - Pluggable generative AI backends (Gemini, mock)
//! - Prompt fixtures (system instruction + few-shot examples)
//! - Storage layer behind the persister boundary

pub mod ai;
pub mod categorize;
pub mod db;
pub mod error;
pub mod heuristics;
pub mod models;
pub mod pipeline;
pub mod prompts;

/// Test utilities including the mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{GeminiBackend, GenerativeBackend, GenerativeClient, MockBackend};
pub use categorize::{categorize, UNCATEGORIZED};
pub use db::{content_hash, Database, TransactionInsertResult};
pub use error::{Error, Result};
pub use heuristics::{parse_receipt_text, UNKNOWN_MERCHANT};
pub use models::{
    CanonicalTransaction, Category, Direction, ExtractionOutcome, Flow, NewTransaction,
    ParsedTransaction, Provenance, StructuredRecord, Transaction,
};
pub use pipeline::{ExtractionPipeline, DEFAULT_TIMEOUT_SECS};
