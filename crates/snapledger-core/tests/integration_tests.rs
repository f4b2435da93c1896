//! Integration tests for snapledger-core
//!
//! These tests exercise the full extract → normalize → persist workflow
//! against the mock Gemini server, including the fallback transition.

use std::time::Duration;

use snapledger_core::{
    content_hash,
    db::Database,
    models::{Direction, NewTransaction, Provenance},
    pipeline::ExtractionPipeline,
    prompts::FEW_SHOT_EXAMPLES,
    test_utils::MockGeminiServer,
    GenerativeClient,
};

fn pipeline_against(server: &MockGeminiServer) -> ExtractionPipeline {
    let client = GenerativeClient::gemini(&server.url(), "gemini-2.0-flash", "test-key");
    ExtractionPipeline::new(Some(client))
}

// =============================================================================
// Extraction Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_full_extract_and_persist_workflow() {
    let server = MockGeminiServer::start().await;
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let pipeline = pipeline_against(&server);

    let receipt = FEW_SHOT_EXAMPLES[0].receipt;
    let outcome = pipeline.extract(receipt).await.expect("extraction failed");

    assert_eq!(outcome.provenance, Provenance::Ai);
    assert_eq!(outcome.transaction.description, "starbucks");
    assert_eq!(outcome.transaction.amount, 8.75);

    let hash = content_hash("alice", receipt);
    let new_tx = NewTransaction::from_outcome(&outcome, Some(hash.clone()));
    let inserted = db.insert_transaction("alice", &new_tx).unwrap();
    assert!(!inserted.is_duplicate());

    let stored = db.get_transaction(inserted.id()).unwrap().unwrap();
    assert_eq!(stored.description, "starbucks");
    assert_eq!(stored.category, "dining");
    assert_eq!(stored.provenance, Provenance::Ai);
    assert_eq!(stored.source_hash.as_deref(), Some(hash.as_str()));

    // Re-submitting the same capture is idempotent
    let again = db.insert_transaction("alice", &new_tx).unwrap();
    assert!(again.is_duplicate());
    assert_eq!(again.id(), inserted.id());
    assert_eq!(db.transaction_count().unwrap(), 1);
}

#[tokio::test]
async fn test_malformed_backend_response_falls_back_and_persists() {
    let server = MockGeminiServer::start().await;
    let db = Database::in_memory().unwrap();
    let pipeline = pipeline_against(&server);

    // NOJSON steers the mock server into returning prose; the rule-based
    // parser must still produce a persistable record from the same text.
    let receipt = "NOJSON\nStarbucks Coffee #117\nFri, Sep 19, 2025\nTotal $8.75";
    let outcome = pipeline.extract(receipt).await.unwrap();

    assert_eq!(outcome.provenance, Provenance::Fallback);
    assert_eq!(outcome.transaction.description, "Starbucks");
    assert_eq!(outcome.transaction.amount, 8.75);
    assert_eq!(outcome.transaction.category, "Dining");

    let new_tx = NewTransaction::from_outcome(&outcome, None);
    let inserted = db.insert_transaction("alice", &new_tx).unwrap();
    assert!(db.get_transaction(inserted.id()).unwrap().is_some());
}

#[tokio::test]
async fn test_schema_violation_falls_back() {
    let server = MockGeminiServer::start().await;
    let pipeline = pipeline_against(&server);

    let outcome = pipeline
        .extract("BADCATEGORY\nWalmart Supercenter\nTOTAL 64.23")
        .await
        .unwrap();

    assert_eq!(outcome.provenance, Provenance::Fallback);
    assert_eq!(outcome.transaction.description, "Walmart");
}

#[tokio::test]
async fn test_unreachable_backend_falls_back() {
    // Nothing listens on this port; the transport error must not surface
    let client = GenerativeClient::gemini("http://127.0.0.1:1", "gemini-2.0-flash", "k");
    let pipeline = ExtractionPipeline::new(Some(client)).with_timeout(Duration::from_secs(5));

    let outcome = pipeline
        .extract("Starbucks Coffee\nTotal $8.75")
        .await
        .unwrap();

    assert_eq!(outcome.provenance, Provenance::Fallback);
    assert_eq!(outcome.transaction.direction, Direction::Debit);
}

#[tokio::test]
async fn test_round_trip_of_canonical_examples_over_http() {
    let server = MockGeminiServer::start().await;
    let pipeline = pipeline_against(&server);

    for example in FEW_SHOT_EXAMPLES {
        let outcome = pipeline.extract(example.receipt).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Ai, "fixture fell back");

        let expected =
            snapledger_core::ai::parsing::parse_structured_record(example.response).unwrap();
        assert_eq!(outcome.transaction.amount, expected.amount);
        assert_eq!(outcome.transaction.direction, expected.flow.direction());
        assert_eq!(outcome.transaction.category, expected.category.as_str());
    }
}

#[tokio::test]
async fn test_idempotent_extraction_over_http() {
    let server = MockGeminiServer::start().await;
    let pipeline = pipeline_against(&server);

    let text = FEW_SHOT_EXAMPLES[2].receipt;
    let first = pipeline.extract(text).await.unwrap();
    let second = pipeline.extract(text).await.unwrap();
    assert_eq!(first.transaction, second.transaction);
}

#[tokio::test]
async fn test_empty_input_never_reaches_backend() {
    let server = MockGeminiServer::start().await;
    let pipeline = pipeline_against(&server);

    let err = pipeline.extract("   \n ").await.unwrap_err();
    assert!(matches!(err, snapledger_core::Error::EmptyInput));
}
