use super::*;

mod prepare_tests {
    use super::*;

    #[test]
    fn test_prepare_trims_and_caps() {
        assert_eq!(prepare_text("  hello world \n", 5), "hello");
        assert_eq!(prepare_text("short", 2000), "short");
        assert_eq!(prepare_text("   ", 10), "");
    }

    #[test]
    fn test_prepare_caps_at_exactly_max_chars() {
        let text = "x".repeat(2500);
        assert_eq!(prepare_text(&text, 2000).chars().count(), 2000);
    }

    #[test]
    fn test_prepare_never_splits_code_points() {
        let text = "é".repeat(10);
        let prepared = prepare_text(&text, 3);
        assert_eq!(prepared, "ééé");
        assert_eq!(prepared.len(), 6);
    }
}

mod plan_tests {
    use super::*;

    fn lens(sizes: &[usize]) -> Vec<String> {
        sizes.iter().map(|n| "a".repeat(*n)).collect()
    }

    #[test]
    fn test_plan_greedy_split() {
        // 4000 + 4000 fits, the third text would exceed 10000.
        let texts = lens(&[4000, 4000, 4000]);
        assert_eq!(plan_batches(&texts, 10_000), vec![0..2, 2..3]);
    }

    #[test]
    fn test_plan_exact_budget_stays_in_batch() {
        let texts = lens(&[5000, 5000, 1]);
        assert_eq!(plan_batches(&texts, 10_000), vec![0..2, 2..3]);
    }

    #[test]
    fn test_plan_oversized_text_gets_own_batch() {
        let texts = lens(&[15, 3, 15]);
        assert_eq!(plan_batches(&texts, 10), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_plan_never_emits_empty_batch() {
        let texts = lens(&[20]);
        assert_eq!(plan_batches(&texts, 10), vec![0..1]);
        assert!(plan_batches::<String>(&[], 10).is_empty());
    }

    #[test]
    fn test_plan_covers_every_index_in_order() {
        let texts = lens(&[1, 9, 2, 8, 3, 7, 10, 10, 1]);
        let plan = plan_batches(&texts, 10);
        let flattened: Vec<usize> = plan.into_iter().flatten().collect();
        assert_eq!(flattened, (0..texts.len()).collect::<Vec<_>>());
    }
}

mod batch_embedder_tests {
    use super::*;

    fn index_embedder() -> MockEmbeddingProvider {
        // Encodes the text length so the output order can be checked.
        MockEmbeddingProvider::with_fn(|text| vec![text.chars().count() as f32, 1.0])
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order_across_requests() {
        let provider = index_embedder();
        let embedder = BatchEmbedder::with_limits(provider.clone(), 2000, 10_000);

        let texts: Vec<String> = (1..=7).map(|n| "a".repeat(n * 1000)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs).await.expect("embed");

        // Every text is capped at 2000 characters.
        assert_eq!(vectors.len(), 7);
        assert_eq!(vectors[0], vec![1000.0, 1.0]);
        assert!(vectors[1..].iter().all(|v| v[0] == 2000.0));

        // 1000 + 2000*4 = 9000, the sixth text opens a second request.
        assert_eq!(provider.call_count(), 2);
        let sizes: Vec<usize> = provider.batches().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 2]);
    }

    #[tokio::test]
    async fn test_embed_batch_submits_prepared_text() {
        let provider = MockEmbeddingProvider::new();
        let embedder = BatchEmbedder::with_limits(provider.clone(), 6, 100);

        embedder
            .embed_batch(&["   Docker tips  "])
            .await
            .expect("embed");
        assert_eq!(provider.batches(), vec![vec!["Docker".to_string()]]);
    }

    #[tokio::test]
    async fn test_embed_batch_empty_makes_no_call() {
        let provider = MockEmbeddingProvider::new();
        let embedder = BatchEmbedder::new(provider.clone());

        let vectors = embedder.embed_batch(&[]).await.expect("embed");
        assert!(vectors.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_embed_batch_aborts_on_provider_error() {
        let provider = index_embedder();
        provider.fail_from_call(1, 429, "rate limited");
        let embedder = BatchEmbedder::with_limits(provider.clone(), 10, 10);

        let err = embedder
            .embed_batch(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"])
            .await
            .expect_err("second request fails");

        match err {
            EmbeddingError::Provider { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected Provider error, got {:?}", other),
        }
        // No retry and no third request.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_embed_batch_rejects_ragged_vectors() {
        let provider = MockEmbeddingProvider::with_fn(|text| vec![1.0; text.len()]);
        let embedder = BatchEmbedder::new(provider);

        let err = embedder.embed_batch(&["ab", "abc"]).await.expect_err("ragged");
        assert!(matches!(err, EmbeddingError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_embed_one() {
        let provider = MockEmbeddingProvider::new();
        provider.set_embedding("What is Docker?", vec![0.5, 0.5]);
        let embedder = BatchEmbedder::new(provider.clone());

        let vector = embedder.embed_one("  What is Docker?  ").await.expect("embed");
        assert_eq!(vector, vec![0.5, 0.5]);
        assert_eq!(provider.total_inputs(), 1);
    }

    #[test]
    fn test_error_status() {
        let err = EmbeddingError::Provider {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("503"));
    }
}

mod mock_tests {
    use super::*;

    #[test]
    fn test_bag_of_words_ignores_case_and_stop_words() {
        assert_eq!(bag_of_words("What is Docker?"), bag_of_words("docker"));
        assert_eq!(bag_of_words("How do I use DOCKER"), bag_of_words("docker"));
        assert_eq!(bag_of_words("docker").len(), MOCK_EMBEDDING_DIM);
    }
}
