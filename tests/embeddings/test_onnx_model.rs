// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Real-model tests; need the ONNX export on disk
//!
//! Run with `cargo test --test embeddings_tests -- --ignored`.

use namuwiki_embedding_server::{
    config::ServiceConfig,
    embeddings::{EmbeddingModelManager, OnnxEmbeddingModel, TextEncoder},
};
use std::path::PathBuf;
use std::sync::Arc;

const MODEL_DIR: &str = "/workspace/models/paraphrase-multilingual-MiniLM-L12-v2-onnx";

fn config() -> ServiceConfig {
    ServiceConfig {
        model_dir: Some(PathBuf::from(MODEL_DIR)),
        ..Default::default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (na * nb)
}

#[test]
#[ignore]
fn test_korean_text_has_384_dimensions() {
    let model = OnnxEmbeddingModel::from_config(&config()).unwrap();
    let vectors = model.encode(&["안녕 나무위키".to_string()]).unwrap();

    assert_eq!(vectors.len(), 1);
    assert_eq!(vectors[0].len(), 384);
    assert!(vectors[0].iter().all(|v| v.is_finite()));
}

#[test]
#[ignore]
fn test_batch_matches_single_encoding() {
    let model = OnnxEmbeddingModel::from_config(&config()).unwrap();
    let batch = model
        .embed_batch(&[
            "짧은 문장".to_string(),
            "이것은 패딩이 필요한 훨씬 더 긴 문장입니다".to_string(),
        ])
        .unwrap();
    let single = model.embed_batch(&["짧은 문장".to_string()]).unwrap();

    assert!(cosine(&batch[0], &single[0]) > 0.999);
}

#[test]
#[ignore]
fn test_paraphrases_are_closer_than_unrelated() {
    let model = OnnxEmbeddingModel::from_config(&config()).unwrap();
    let vectors = model
        .embed_batch(&[
            "서울은 대한민국의 수도이다".to_string(),
            "The capital of South Korea is Seoul".to_string(),
            "고양이는 생선을 좋아한다".to_string(),
        ])
        .unwrap();

    assert!(cosine(&vectors[0], &vectors[1]) > cosine(&vectors[0], &vectors[2]));
}

#[tokio::test]
#[ignore]
async fn test_manager_initialize_loads_model() {
    let manager = Arc::new(EmbeddingModelManager::new(config().model_name));
    let lease = manager.initialize(&config()).await.unwrap();
    assert!(manager.is_loaded());

    let vectors = manager.encode(vec!["나무위키".to_string()]).await.unwrap();
    assert_eq!(vectors[0].len(), 384);

    drop(lease);
    assert!(!manager.is_loaded());
}
