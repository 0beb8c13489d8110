// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-output encoder used to exercise the HTTP layer without model weights

use super::{EmbeddingError, TextEncoder};

/// Returns the same `dimension`-length vector of `value` for every text
#[derive(Debug, Clone)]
pub struct ConstantEncoder {
    value: f32,
    dimension: usize,
    model_name: String,
}

impl ConstantEncoder {
    pub fn new(value: f32, dimension: usize) -> Self {
        Self {
            value,
            dimension,
            model_name: "constant-encoder".to_string(),
        }
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }
}

impl TextEncoder for ConstantEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| vec![self.value; self.dimension]).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
