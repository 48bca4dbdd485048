//! End-to-End Integration Tests
//!
//! Full submit → interpret → feedback cycle against a mock backend.

mod common;

use common::{chunk, response, MockBackend, DOC, QUERY};
use semqa::core::{read_log, render_document};
use semqa::{best_answer, render_chunk, FeedbackChoice, QueryOrchestrator, Session, SentimentVerdict};
use tempfile::TempDir;

#[tokio::test]
async fn test_rates_example() {
    let backend = MockBackend::responding(response(vec![chunk(
        "Rates rose 2%.",
        "Rates rose 2%.",
        0.87,
        Some("neutral"),
    )]));
    let orchestrator = QueryOrchestrator::new(backend);
    let mut session = Session::new();

    orchestrator
        .submit(&mut session, DOC, QUERY, 5)
        .await
        .unwrap();

    let doc = &session.results().unwrap().documents[0];
    let top = &doc.chunks[0];
    assert_eq!(top.qa_start(), 0);
    assert_eq!(top.qa_end(), 14);

    let best = best_answer(doc).unwrap();
    assert_eq!(best.answer, "Rates rose 2%.");
    assert_eq!(best.score, 0.87);

    let rendered = render_chunk(top);
    assert_eq!(rendered.sentiment, SentimentVerdict::Neutral);
    assert_eq!(rendered.answer, "Rates rose 2%.");
}

#[tokio::test]
async fn test_rank_order_beats_score() {
    let backend = MockBackend::responding(response(vec![
        chunk("Rates rose 2%.", "Rates", 0.2, None),
        chunk("The Fed is hawkish.", "The Fed", 0.9, Some("negative")),
    ]));
    let orchestrator = QueryOrchestrator::new(backend);
    let mut session = Session::new();

    orchestrator
        .submit(&mut session, DOC, QUERY, 5)
        .await
        .unwrap();

    let doc = &session.results().unwrap().documents[0];
    let best = best_answer(doc).unwrap();
    assert_eq!(best.answer, "Rates");
    assert_eq!(best.score, 0.2);

    let rendered = render_document(doc, 0, None).unwrap();
    assert_eq!(rendered.chunks[0].sentiment, SentimentVerdict::Unavailable);
    assert_eq!(rendered.chunks[1].sentiment, SentimentVerdict::Negative);
}

#[tokio::test]
async fn test_full_cycle_writes_one_row() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("feedback.tsv");

    let backend = MockBackend::responding(response(vec![
        chunk("Rates rose 2%.", "Rates rose 2%.", 0.87, Some("neutral")),
        chunk("The Fed is hawkish.", "The Fed", 0.42, Some("negative")),
    ]));
    let orchestrator = QueryOrchestrator::new(backend);
    let mut session = Session::new();

    orchestrator
        .submit(&mut session, DOC, QUERY, 5)
        .await
        .unwrap();
    orchestrator
        .give_feedback(&mut session, &log, FeedbackChoice::Chunk(1))
        .unwrap();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(
        contents,
        "Rates rose 2%. The Fed is hawkish.\tWho raised rates?\tRates rose 2%.\tThe Fed is hawkish.\n"
    );

    let records = read_log(&log).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].has_correction());
}
