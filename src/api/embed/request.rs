// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed

use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// `texts` is required and may be empty. No length or character limits are
/// enforced here; whatever the model's tokenizer accepts is passed through.
///
/// # Example
/// ```json
/// { "texts": ["안녕 나무위키", "Another text"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedRequest {
    /// Texts to embed, in the order vectors should come back
    pub texts: Vec<String>,
}

impl EmbedRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }
}
