// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status reported by GET /health whenever the process can answer
pub const HEALTH_STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// Configured model identifier, reported even when the model is not loaded
    pub model: String,
}

impl HealthResponse {
    pub fn ok(model: impl Into<String>) -> Self {
        Self {
            status: HEALTH_STATUS_OK.to_string(),
            model: model.into(),
        }
    }
}

/// GET /health
///
/// Liveness only. Never touches the model handle, so it answers `ok` while
/// the model is loading, after a failed load, and in test mode.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.model_manager.model_name()))
}
