// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model layer
//!
//! The HTTP handlers never see a concrete model. They talk to the
//! [`EmbeddingModelManager`], which holds at most one [`TextEncoder`]
//! for the lifetime of the process.

pub mod errors;
pub mod model_manager;
pub mod onnx_model;
pub mod stub;

pub use errors::EmbeddingError;
pub use model_manager::{EmbeddingModelManager, ModelLease, ModelState};
pub use onnx_model::OnnxEmbeddingModel;
pub use stub::ConstantEncoder;

/// Capability to turn an ordered batch of texts into vectors.
///
/// Implementations are blocking and CPU/accelerator bound; callers run
/// them off the async executor.
pub trait TextEncoder: Send + Sync {
    /// Encodes `texts` into one vector per text, in input order
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimension of every vector
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model
    fn model_name(&self) -> &str;
}
