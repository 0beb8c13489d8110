// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed through the full router

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use namuwiki_embedding_server::{
    api::{create_app, AppState},
    embeddings::{ConstantEncoder, EmbeddingError, TextEncoder},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Encoder whose vectors encode the text length, so order is observable
struct LengthEncoder;

impl TextEncoder for LengthEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| vec![t.chars().count() as f32; 4])
            .collect())
    }

    fn dimension(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "length"
    }
}

struct FailingEncoder;

impl TextEncoder for FailingEncoder {
    fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::EncodeFailed("CUDA out of memory".to_string()))
    }

    fn dimension(&self) -> usize {
        384
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

fn state_with(encoder: Option<Arc<dyn TextEncoder>>) -> Arc<AppState> {
    let state = AppState::new_for_test();
    if let Some(encoder) = encoder {
        state.model_manager.install(encoder).unwrap();
    }
    Arc::new(state)
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_empty_texts_without_model() {
    let app = create_app(state_with(None));
    let (status, body) = send(app, json_request(r#"{"texts": []}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"embeddings": []}));
}

#[tokio::test]
async fn test_unloaded_model_returns_500() {
    let app = create_app(state_with(None));
    let (status, body) = send(app, json_request(r#"{"texts": ["hello"]}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "model_not_loaded");
    assert!(body["request_id"].is_string());
    assert!(body.get("embeddings").is_none());
}

#[tokio::test]
async fn test_single_korean_text_with_constant_encoder() {
    let app = create_app(state_with(Some(Arc::new(ConstantEncoder::new(0.1, 384)))));
    let (status, body) = send(app, json_request(r#"{"texts": ["안녕 나무위키"]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let embeddings = body["embeddings"].as_array().unwrap();
    assert_eq!(embeddings.len(), 1);

    let vector = embeddings[0].as_array().unwrap();
    assert_eq!(vector.len(), 384);
    assert!(vector
        .iter()
        .all(|v| (v.as_f64().unwrap() - 0.1).abs() < 1e-6));
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let app = create_app(state_with(Some(Arc::new(LengthEncoder))));
    let (status, body) = send(app, json_request(r#"{"texts": ["a", "bbb", "bb"]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let firsts: Vec<f64> = body["embeddings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v[0].as_f64().unwrap())
        .collect();
    assert_eq!(firsts, vec![1.0, 3.0, 2.0]);
}

#[tokio::test]
async fn test_repeated_request_is_identical() {
    let state = state_with(Some(Arc::new(ConstantEncoder::new(0.25, 16))));
    let body = r#"{"texts": ["x", "y"]}"#;

    let (_, first) = send(create_app(state.clone()), json_request(body)).await;
    let (_, second) = send(create_app(state), json_request(body)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_encode_failure_returns_500() {
    let app = create_app(state_with(Some(Arc::new(FailingEncoder))));
    let (status, body) = send(app, json_request(r#"{"texts": ["hello"]}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "encode_failed");
    assert!(body["message"].as_str().unwrap().contains("out of memory"));
}

#[tokio::test]
async fn test_model_released_after_shutdown() {
    let state = state_with(Some(Arc::new(ConstantEncoder::new(0.1, 384))));
    let (status, _) = send(create_app(state.clone()), json_request(r#"{"texts": ["a"]}"#)).await;
    assert_eq!(status, StatusCode::OK);

    state.model_manager.shutdown();

    let (status, _) = send(create_app(state), json_request(r#"{"texts": ["a"]}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_texts_field_is_422() {
    let app = create_app(state_with(None));
    let (status, body) = send(app, json_request(r#"{"text": ["a"]}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_non_string_texts_is_422() {
    let app = create_app(state_with(None));
    let (status, _) = send(app, json_request(r#"{"texts": [1, 2, 3]}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = create_app(state_with(None));
    let (status, body) = send(app, json_request(r#"{"texts": ["#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_missing_content_type_is_415() {
    let app = create_app(state_with(None));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .body(Body::from(r#"{"texts": []}"#))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error_type"], "unsupported_media_type");
}

#[tokio::test]
async fn test_get_embed_not_allowed() {
    let app = create_app(state_with(None));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/embed")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
