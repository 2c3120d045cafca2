//! Persisted embedding artifacts across retriever instances.

mod common;

use std::sync::Arc;

use retrieval::{
    BatchEmbedder, CacheError, Corpus, EmbeddingCache, EmbeddingError, JsonRecordSource,
    MockEmbeddingProvider, RetrievalError, Retriever,
};

use common::fixtures::{init_tracing, test_config, topic_provider, write_forum_snapshot};

fn forum(
    config: &retrieval::Config,
    provider: &MockEmbeddingProvider,
) -> Retriever<JsonRecordSource, MockEmbeddingProvider> {
    let path = config
        .corpus_dir(Corpus::Forum)
        .join(Corpus::Forum.records_file_name());
    Retriever::from_config(
        config,
        Corpus::Forum,
        JsonRecordSource::new(path),
        Arc::new(BatchEmbedder::from_config(provider.clone(), config)),
    )
}

#[tokio::test]
async fn test_corrupt_matrix_fails_without_rebuild() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path());
    write_forum_snapshot(&config);
    let provider = topic_provider();

    let cache = EmbeddingCache::from_config(&config, Corpus::Forum);
    std::fs::write(cache.matrix_path(), b"[[0.1, 0.2], [0.3]]").expect("write junk");

    let err = forum(&config, &provider)
        .retrieve("docker")
        .await
        .expect_err("corrupt cache");

    assert!(matches!(
        err,
        RetrievalError::Cache(CacheError::Corrupt(_))
    ));
    assert_eq!(provider.call_count(), 0);
    // The artifact is left for an operator to inspect.
    assert!(cache.exists());
}

#[tokio::test]
async fn test_deleting_matrix_triggers_rebuild() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path());
    write_forum_snapshot(&config);
    let provider = topic_provider();

    forum(&config, &provider).prepare().await.expect("build");
    let cache = EmbeddingCache::from_config(&config, Corpus::Forum);
    assert!(cache.invalidate().expect("invalidate"));

    forum(&config, &provider).prepare().await.expect("rebuild");
    assert_eq!(provider.call_count(), 2);
    assert!(cache.exists());
}

#[tokio::test]
async fn test_force_rebuild_from_config() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(dir.path());
    write_forum_snapshot(&config);
    let provider = topic_provider();

    forum(&config, &provider).prepare().await.expect("build");
    forum(&config, &provider).prepare().await.expect("reuse");
    assert_eq!(provider.call_count(), 1);

    config.force_rebuild = true;
    forum(&config, &provider).prepare().await.expect("forced");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_provider_error_leaves_no_artifact_and_retries_next_time() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path());
    write_forum_snapshot(&config);
    let provider = topic_provider();
    provider.fail_from_call(0, 503, "upstream unavailable");

    let retriever = forum(&config, &provider);
    let err = retriever.retrieve("docker").await.expect_err("provider down");
    assert!(matches!(
        err,
        RetrievalError::Cache(CacheError::Embedding(EmbeddingError::Provider {
            status: 503,
            ..
        }))
    ));
    assert!(!EmbeddingCache::from_config(&config, Corpus::Forum).exists());

    provider.clear_failure();
    let matches = retriever.retrieve("docker").await.expect("recovered");
    assert_eq!(matches.len(), 1);
}

#[tokio::test]
async fn test_mirror_holds_embedded_texts() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path());
    write_forum_snapshot(&config);
    let provider = topic_provider();

    forum(&config, &provider).prepare().await.expect("build");

    let cache = EmbeddingCache::from_config(&config, Corpus::Forum);
    assert_eq!(
        cache.lookup("What is Docker?").expect("lookup"),
        Some(vec![1.0, 0.0, 0.0])
    );
    assert_eq!(
        cache.lookup("How do I undo a Git rebase?").expect("lookup"),
        Some(vec![0.0, 1.0, 0.0])
    );
}
