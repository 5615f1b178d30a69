//! Persistence and load reconciliation.

use crate::config::StoragePaths;
use crate::embeddings::providers::mock::MockProvider;
use crate::embeddings::providers::trigram::TrigramProvider;
use crate::engine::RetrievalEngine;
use crate::persist;
use crate::types::{MatchKind, QaPair};
use std::sync::Arc;
use tempfile::TempDir;

fn sample() -> Vec<(String, String)> {
    [
        ("What is Rust?", "A systems programming language"),
        ("Who maintains cargo?", "The Rust project"),
        ("What is a crate?", "A compilation unit"),
    ]
    .iter()
    .map(|(q, a)| (q.to_string(), a.to_string()))
    .collect()
}

#[tokio::test]
async fn test_persist_then_reload_gives_identical_results() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(TrigramProvider::new(128)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();
    engine.persist().unwrap();

    let reloaded = RetrievalEngine::open(Arc::new(TrigramProvider::new(128)), paths)
        .await
        .unwrap();

    assert_eq!(reloaded.pairs(), engine.pairs());
    for question in ["what is rust", "cargo maintainers", "crate", "unrelated words"] {
        let before = engine.query(question, 1).await.unwrap();
        let after = reloaded.query(question, 1).await.unwrap();
        assert_eq!(before, after, "question {:?}", question);
    }
}

#[tokio::test]
async fn test_valid_artifacts_load_without_embedding() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(MockProvider::new(8)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();

    let provider = Arc::new(MockProvider::new(8));
    let reloaded = RetrievalEngine::open(provider.clone(), paths).await.unwrap();

    assert_eq!(reloaded.len(), 3);
    assert_eq!(provider.embedded_count(), 0);
}

#[tokio::test]
async fn test_missing_artifacts_start_empty() {
    let temp = TempDir::new().unwrap();
    let engine = RetrievalEngine::open(
        Arc::new(MockProvider::new(4)),
        StoragePaths::in_dir(temp.path()),
    )
    .await
    .unwrap();

    assert!(engine.is_empty());
    assert_eq!(engine.query("x", 1).await.unwrap().kind, MatchKind::EmptyBase);
}

#[tokio::test]
async fn test_corrupt_answers_reset_to_empty() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(MockProvider::new(4)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();
    std::fs::write(&paths.answers, "{ not json").unwrap();

    let reloaded = RetrievalEngine::open(Arc::new(MockProvider::new(4)), paths)
        .await
        .unwrap();
    assert!(reloaded.is_empty());
    assert_eq!(reloaded.index_len(), 0);
}

#[tokio::test]
async fn test_answers_with_gaps_reset_to_empty() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());
    std::fs::write(
        &paths.answers,
        r#"{"0": {"question": "a", "answer": "1"}, "2": {"question": "c", "answer": "3"}}"#,
    )
    .unwrap();

    let engine = RetrievalEngine::open(Arc::new(MockProvider::new(4)), paths)
        .await
        .unwrap();
    assert!(engine.is_empty());
}

#[tokio::test]
async fn test_corrupt_index_is_rederived() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(MockProvider::new(4)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();
    std::fs::write(&paths.index, b"garbage").unwrap();

    let provider = Arc::new(MockProvider::new(4));
    let reloaded = RetrievalEngine::open(provider.clone(), paths.clone())
        .await
        .unwrap();

    assert_eq!(reloaded.pairs(), engine.pairs());
    assert_eq!(reloaded.index_len(), 3);
    assert_eq!(provider.embedded_count(), 3);
    assert_eq!(
        reloaded.query("What is a crate?", 1).await.unwrap().answer,
        "A compilation unit"
    );

    // The rewritten index is valid for the next open
    assert!(persist::read_index(&paths.index).unwrap().is_some());
}

#[tokio::test]
async fn test_missing_index_is_rederived() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());
    persist::write_pairs(&paths.answers, &[QaPair::new("hand written", "works")]).unwrap();

    let engine = RetrievalEngine::open(Arc::new(MockProvider::new(4)), paths)
        .await
        .unwrap();
    assert_eq!(engine.query("hand written", 1).await.unwrap().answer, "works");
}

#[tokio::test]
async fn test_index_from_other_embedder_is_rederived() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(MockProvider::new(4)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();

    // Same pairs, different provider and dimensionality
    let reloaded = RetrievalEngine::open(Arc::new(TrigramProvider::new(64)), paths.clone())
        .await
        .unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.index_len(), 3);

    let artifact = persist::read_index(&paths.index).unwrap().unwrap();
    assert_eq!(artifact.provider, "trigram");
    assert_eq!(crate::VectorIndex::dimension(&artifact.index), 64);
}

#[tokio::test]
async fn test_edited_questions_are_rederived() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());
    let provider = MockProvider::new(2)
        .with_vector("old question", vec![0.0, 0.0])
        .with_vector("new question", vec![9.0, 9.0])
        .with_vector("decoy", vec![5.0, 5.0]);

    let mut engine = RetrievalEngine::empty(Arc::new(provider), paths.clone());
    engine
        .ingest_bulk(vec![
            ("old question".to_string(), "target".to_string()),
            ("decoy".to_string(), "decoy".to_string()),
        ])
        .await
        .unwrap();

    // Edit the answers artifact by hand; the index still holds the old rows
    persist::write_pairs(
        &paths.answers,
        &[
            QaPair::new("new question", "target"),
            QaPair::new("decoy", "decoy"),
        ],
    )
    .unwrap();

    let provider = Arc::new(
        MockProvider::new(2)
            .with_vector("new question", vec![9.0, 9.0])
            .with_vector("decoy", vec![5.0, 5.0]),
    );
    let reloaded = RetrievalEngine::open(provider.clone(), paths).await.unwrap();

    assert_eq!(provider.embedded_count(), 2);
    assert_eq!(reloaded.query("new question", 1).await.unwrap().answer, "target");
}

#[tokio::test]
async fn test_answers_artifact_is_keyed_by_position() {
    let temp = TempDir::new().unwrap();
    let paths = StoragePaths::in_dir(temp.path());

    let mut engine = RetrievalEngine::empty(Arc::new(MockProvider::new(4)), paths.clone());
    engine.ingest_bulk(sample()).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.answers).unwrap()).unwrap();
    assert_eq!(json["0"]["question"], "What is Rust?");
    assert_eq!(json["2"]["answer"], "A compilation unit");
}
