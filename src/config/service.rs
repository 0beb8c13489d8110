// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the embedding service

use std::env;
use std::path::PathBuf;

/// Pretrained model served when `EMBEDDING_MODEL` is not set
pub const DEFAULT_MODEL_NAME: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Output dimension of the default model
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Max sequence length the default model was trained with
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 128;

/// Where the documentation redirects point by default
///
/// This page is served by the ingestion app's gateway, which fronts this service
/// on the same origin. The embedding server does not serve it itself; run
/// standalone, set `DOCS_REDIRECT_URL` (an absolute URL works) or the redirect
/// lands on the fallback and ends at `/`.
pub const DEFAULT_DOCS_REDIRECT_URL: &str = "/api-docs-unified.html";

/// Configuration for the embedding service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Model identifier reported by /health and used for loading
    pub model_name: String,
    /// Local directory with model.onnx and tokenizer.json (otherwise HF Hub)
    pub model_dir: Option<PathBuf>,
    /// Expected embedding dimension
    pub dimensions: usize,
    /// Tokenizer truncation length
    pub max_sequence_length: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Target of /doc, /swagger-ui and friends; relative paths resolve
    /// against whatever origin fronts this service
    pub docs_redirect_url: String,
    /// Skip model loading so the HTTP layer can run without weights
    pub testing: bool,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_name: env::var("EMBEDDING_MODEL").unwrap_or(defaults.model_name),
            model_dir: env::var("EMBEDDING_MODEL_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            dimensions: env::var("EMBEDDING_DIMENSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dimensions),
            max_sequence_length: env::var("MAX_SEQUENCE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_sequence_length),
            intra_threads: env::var("ONNX_INTRA_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.intra_threads),
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            docs_redirect_url: env::var("DOCS_REDIRECT_URL").unwrap_or(defaults.docs_redirect_url),
            testing: env::var("TESTING")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model_name.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.dimensions == 0 {
            return Err("Embedding dimensions must be greater than 0".to_string());
        }
        if self.max_sequence_length == 0 {
            return Err("Max sequence length must be greater than 0".to_string());
        }
        if self.intra_threads == 0 {
            return Err("ONNX intra threads must be greater than 0".to_string());
        }
        if self.docs_redirect_url.trim().is_empty() {
            return Err("Docs redirect URL cannot be empty".to_string());
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: None,
            dimensions: DEFAULT_DIMENSIONS,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            intra_threads: 4,
            host: "0.0.0.0".to_string(),
            port: 8000,
            docs_redirect_url: DEFAULT_DOCS_REDIRECT_URL.to_string(),
            testing: false,
        }
    }
}

/// `1`, `true`, `yes` and `on` (any case) enable a flag
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
