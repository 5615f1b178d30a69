//! End-to-end retrieval behavior through the public engine API.

use crate::config::StoragePaths;
use crate::embeddings::providers::mock::MockProvider;
use crate::embeddings::providers::trigram::TrigramProvider;
use crate::engine::RetrievalEngine;
use crate::types::{MatchKind, QaPair, EMPTY_BASE_ANSWER};
use std::sync::Arc;
use tempfile::TempDir;

fn trigram_engine(temp: &TempDir) -> RetrievalEngine {
    RetrievalEngine::empty(
        Arc::new(TrigramProvider::new(384)),
        StoragePaths::in_dir(temp.path()),
    )
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(q, a)| (q.to_string(), a.to_string()))
        .collect()
}

#[tokio::test]
async fn test_exact_question_matches_itself() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    engine
        .ingest_bulk(pairs(&[
            ("What is the capital of France?", "Paris"),
            ("How many legs does a spider have?", "Eight"),
            ("Who wrote Hamlet?", "Shakespeare"),
        ]))
        .await
        .unwrap();

    for (question, answer) in [
        ("What is the capital of France?", "Paris"),
        ("How many legs does a spider have?", "Eight"),
        ("Who wrote Hamlet?", "Shakespeare"),
    ] {
        let result = engine.query(question, 1).await.unwrap();
        assert_eq!(result.answer, answer);
        assert!(result.distance.abs() < 1e-5, "distance {}", result.distance);
    }
}

#[tokio::test]
async fn test_paraphrase_finds_closest_question() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    engine
        .ingest_bulk(pairs(&[
            ("What is the capital of France?", "Paris"),
            ("How do I reset my password?", "Use the account settings page"),
            ("What time does the store open?", "9am"),
        ]))
        .await
        .unwrap();

    let result = engine.query("how can I reset the password", 3).await.unwrap();
    assert_eq!(result.kind, MatchKind::Matched);
    assert_eq!(result.answer, "Use the account settings page");
    assert_eq!(result.position, 1);
}

#[tokio::test]
async fn test_questions_differing_in_stop_words_stay_distinct() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    let items = [
        ("Who is it for?", "the client"),
        ("Who is it from?", "the vendor"),
        ("What is the capital of France?", "Paris"),
        ("What was the capital of France?", "Versailles once"),
    ];
    engine.ingest_bulk(pairs(&items)).await.unwrap();

    for (position, (question, answer)) in items.iter().enumerate() {
        let result = engine.query(question, 1).await.unwrap();
        assert_eq!(result.answer, *answer, "question {:?}", question);
        assert_eq!(result.position, position as i64);
        assert!(result.distance.abs() < 1e-5);
    }
}

#[tokio::test]
async fn test_bulk_single_letter_questions() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    engine.ingest_bulk(pairs(&[("A", "1"), ("B", "2")])).await.unwrap();

    assert_eq!(engine.query("A", 1).await.unwrap().answer, "1");
    assert_eq!(engine.query("B", 1).await.unwrap().answer, "2");
}

#[tokio::test]
async fn test_k_larger_than_base_is_fine() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);
    engine.ingest_single("only question", "only answer").await.unwrap();

    let result = engine.query("only question", 50).await.unwrap();
    assert_eq!(result.answer, "only answer");
    assert_eq!(result.position, 0);
}

#[tokio::test]
async fn test_zero_k_is_treated_as_one() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);
    engine.ingest_single("q", "a").await.unwrap();

    assert_eq!(engine.query("q", 0).await.unwrap().answer, "a");
}

#[tokio::test]
async fn test_index_and_store_stay_aligned() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    engine.ingest_single("first", "1").await.unwrap();
    assert_eq!(engine.index_len(), engine.store_len());

    engine
        .ingest_bulk(pairs(&[("second", "2"), ("first", "one"), ("third", "3")]))
        .await
        .unwrap();
    assert_eq!(engine.index_len(), 3);
    assert_eq!(engine.store_len(), 3);

    for (position, pair) in engine.pairs().iter().enumerate() {
        assert_eq!(engine.answer_at(position), Some(pair.answer.as_str()));
    }

    engine.clear().await.unwrap();
    assert_eq!(engine.index_len(), 0);
    assert_eq!(engine.store_len(), 0);
}

#[tokio::test]
async fn test_later_duplicate_in_bulk_wins() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);

    let report = engine
        .ingest_bulk(pairs(&[("Q", "first"), ("other", "x"), ("Q", "second")]))
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.updated, 1);
    assert_eq!(
        engine.pairs(),
        &[QaPair::new("Q", "second"), QaPair::new("other", "x")]
    );
}

#[tokio::test]
async fn test_nearest_by_euclidean_distance() {
    let temp = TempDir::new().unwrap();
    let provider = MockProvider::new(2)
        .with_vector("far same direction", vec![10.0, 0.0])
        .with_vector("near other direction", vec![0.8, 0.6])
        .with_vector("query point", vec![1.0, 0.0]);
    let mut engine =
        RetrievalEngine::empty(Arc::new(provider), StoragePaths::in_dir(temp.path()));

    engine
        .ingest_bulk(pairs(&[
            ("far same direction", "far"),
            ("near other direction", "near"),
        ]))
        .await
        .unwrap();

    let result = engine.query("query point", 2).await.unwrap();
    assert_eq!(result.answer, "near");
    assert!((result.distance - 0.4).abs() < 1e-6);
}

#[tokio::test]
async fn test_empty_engine_sentinel_after_clear() {
    let temp = TempDir::new().unwrap();
    let mut engine = trigram_engine(&temp);
    engine.ingest_single("q", "a").await.unwrap();
    engine.clear().await.unwrap();

    let result = engine.query("q", 1).await.unwrap();
    assert_eq!(result.answer, EMPTY_BASE_ANSWER);
    assert_eq!(result.position, -1);
    assert!(result.distance.is_infinite());
}
