// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// One vector per input text, in input order, all of the model's dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

impl EmbedResponse {
    /// Response for an empty request
    pub fn empty() -> Self {
        Self { embeddings: vec![] }
    }

    pub fn embedding_count(&self) -> usize {
        self.embeddings.len()
    }

    /// Dimension of the vectors, `None` when there are none
    pub fn dimensions(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }
}

impl From<Vec<Vec<f32>>> for EmbedResponse {
    fn from(embeddings: Vec<Vec<f32>>) -> Self {
        Self { embeddings }
    }
}
