// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the embedding model layer

use thiserror::Error;

/// Errors raised while loading or running the embedding model
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Encode attempted while the model handle is empty
    #[error("Embedding model is not loaded")]
    ModelNotLoaded,

    /// Initialize called on a handle that already holds a model
    #[error("Embedding model {0} is already loaded")]
    AlreadyLoaded(String),

    /// Model or tokenizer could not be loaded
    #[error("Failed to load embedding model {model}: {reason}")]
    LoadFailed { model: String, reason: String },

    /// The underlying model failed while encoding
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    /// Encoder returned a different number of vectors than texts
    #[error("Encoder returned {actual} vectors for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },

    /// A vector does not have the model's dimensionality
    #[error("Embedding at index {index} has {actual} dimensions (expected {expected})")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// The blocking encode task panicked or was cancelled
    #[error("Encode task failed: {0}")]
    TaskFailed(String),
}

impl From<anyhow::Error> for EmbeddingError {
    fn from(err: anyhow::Error) -> Self {
        EmbeddingError::EncodeFailed(format!("{:#}", err))
    }
}

impl EmbeddingError {
    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            EmbeddingError::ModelNotLoaded => "MODEL_NOT_LOADED",
            EmbeddingError::AlreadyLoaded(_) => "MODEL_ALREADY_LOADED",
            EmbeddingError::LoadFailed { .. } => "MODEL_LOAD_FAILED",
            EmbeddingError::EncodeFailed(_) => "ENCODE_FAILED",
            EmbeddingError::CountMismatch { .. } => "COUNT_MISMATCH",
            EmbeddingError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            EmbeddingError::TaskFailed(_) => "TASK_FAILED",
        }
    }
}
