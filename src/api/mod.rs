// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod docs;
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod server;

pub use docs::{openapi_document, DOCS_REDIRECT_PATHS};
pub use embed::{embed_handler, EmbedRequest, EmbedResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse, HEALTH_STATUS_OK};
pub use server::{create_app, ApiServer, AppState};
