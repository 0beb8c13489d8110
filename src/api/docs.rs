// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Landing page, OpenAPI document and documentation redirects

use crate::api::server::AppState;
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Paths that redirect to the configured documentation page
pub const DOCS_REDIRECT_PATHS: &[&str] = &[
    "/doc",
    "/doc/",
    "/docs",
    "/docs/",
    "/swagger-ui",
    "/swagger-ui/",
    "/swagger-ui.html",
    "/redoc",
];

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="utf-8">
  <title>Namuwiki Embedding API</title>
</head>
<body>
  <h1>Namuwiki Embedding API</h1>
  <p>나무위키 문서 임베딩 서비스</p>
  <ul>
    <li><code>POST /embed</code> - 텍스트 목록을 임베딩 벡터로 변환</li>
    <li><a href="/health"><code>GET /health</code></a> - 상태 확인</li>
    <li><a href="/openapi.json"><code>GET /openapi.json</code></a> - OpenAPI 문서</li>
    <li><a href="/doc">API 문서</a></li>
  </ul>
</body>
</html>
"#;

/// GET /
pub async fn landing_page_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET on any of [`DOCS_REDIRECT_PATHS`]
pub async fn docs_redirect_handler(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&state.docs_redirect_url)
}

/// Any unmatched path goes back to the landing page
pub async fn fallback_handler(uri: axum::http::Uri) -> Redirect {
    debug!("No route for {}, redirecting to /", uri.path());
    Redirect::to("/")
}

/// GET /openapi.json
pub async fn openapi_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(openapi_document(state.model_manager.model_name()))
}

pub fn openapi_document(model_name: &str) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Namuwiki Embedding API",
            "version": crate::version::VERSION_NUMBER,
            "description": format!("Sentence embeddings for Namuwiki ingestion using {}", model_name)
        },
        "paths": {
            "/embed": {
                "post": {
                    "summary": "Embed a batch of texts",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/EmbedRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "One vector per input text, in input order",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/EmbedResponse" }
                                }
                            }
                        },
                        "400": error_response_ref("Malformed JSON body"),
                        "415": error_response_ref("Missing JSON content type"),
                        "422": error_response_ref("Body does not match EmbedRequest"),
                        "500": error_response_ref("Model not loaded or encoding failed")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness check",
                    "responses": {
                        "200": {
                            "description": "Service is up",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/HealthResponse" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "EmbedRequest": {
                    "type": "object",
                    "required": ["texts"],
                    "properties": {
                        "texts": { "type": "array", "items": { "type": "string" } }
                    }
                },
                "EmbedResponse": {
                    "type": "object",
                    "required": ["embeddings"],
                    "properties": {
                        "embeddings": {
                            "type": "array",
                            "items": { "type": "array", "items": { "type": "number" } }
                        }
                    }
                },
                "HealthResponse": {
                    "type": "object",
                    "required": ["status", "model"],
                    "properties": {
                        "status": { "type": "string", "example": "ok" },
                        "model": { "type": "string", "example": model_name }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "required": ["error_type", "message"],
                    "properties": {
                        "error_type": { "type": "string" },
                        "message": { "type": "string" },
                        "request_id": { "type": "string", "nullable": true },
                        "details": { "type": "object", "nullable": true }
                    }
                }
            }
        }
    })
}

fn error_response_ref(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}
