// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod service;

pub use service::{
    ServiceConfig, DEFAULT_DIMENSIONS, DEFAULT_DOCS_REDIRECT_URL, DEFAULT_MAX_SEQUENCE_LENGTH,
    DEFAULT_MODEL_NAME,
};
