// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingModelManager lifecycle tests

use namuwiki_embedding_server::{
    config::ServiceConfig,
    embeddings::{ConstantEncoder, EmbeddingError, EmbeddingModelManager, ModelState},
};
use std::sync::Arc;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_testing_flag_skips_load() {
    let manager = Arc::new(EmbeddingModelManager::new("never-downloaded/model"));
    let config = ServiceConfig {
        model_name: "never-downloaded/model".to_string(),
        testing: true,
        ..Default::default()
    };

    let _lease = manager.initialize(&config).await.unwrap();
    assert_eq!(manager.state(), ModelState::Unloaded);

    let err = manager.encode(texts(&["hello"])).await.unwrap_err();
    assert!(matches!(err, EmbeddingError::ModelNotLoaded));
}

#[tokio::test]
async fn test_installed_stub_then_lease_release() {
    let manager = Arc::new(EmbeddingModelManager::new("stub"));
    let config = ServiceConfig {
        testing: true,
        ..Default::default()
    };
    let lease = manager.initialize(&config).await.unwrap();

    manager
        .install(Arc::new(ConstantEncoder::new(0.1, 384).with_model_name("stub")))
        .unwrap();
    let vectors = manager.encode(texts(&["안녕 나무위키"])).await.unwrap();
    assert_eq!(vectors, vec![vec![0.1f32; 384]]);

    drop(lease);
    assert_eq!(manager.state(), ModelState::Unloaded);
    assert!(manager.encode(texts(&["again"])).await.is_err());
}

#[tokio::test]
async fn test_concurrent_encodes_share_model() {
    let manager = Arc::new(EmbeddingModelManager::new("stub"));
    manager
        .install(Arc::new(ConstantEncoder::new(1.0, 8)))
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.encode(vec![format!("text {}", i)]).await })
        })
        .collect();

    for handle in handles {
        let vectors = handle.await.unwrap().unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), 8);
    }
}

#[tokio::test]
async fn test_empty_batch_never_needs_model() {
    let manager = EmbeddingModelManager::new("stub");
    assert!(manager.encode(vec![]).await.unwrap().is_empty());
}
