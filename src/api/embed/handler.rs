// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::server::AppState;
use crate::api::ApiError;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "texts": ["text1", "text2"] }
/// ```
///
/// # Response Body
/// ```json
/// { "embeddings": [[0.1, 0.2, ...], [0.3, 0.4, ...]] }
/// ```
///
/// # Errors
/// - 4xx when the body is not `{"texts": [string]}`
/// - 500 when the model is not loaded or encoding fails
pub async fn embed_handler(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<EmbedRequest>, ApiError>,
) -> Result<Json<EmbedResponse>, ApiError> {
    if request.is_empty() {
        debug!("Empty embed request, returning no embeddings");
        return Ok(Json(EmbedResponse::empty()));
    }

    let text_count = request.len();
    let started = Instant::now();

    let embeddings = state.model_manager.encode(request.texts).await?;

    info!(
        texts = text_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Embedded batch"
    );

    Ok(Json(EmbedResponse::from(embeddings)))
}
