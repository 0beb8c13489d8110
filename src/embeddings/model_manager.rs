// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Model Manager
//!
//! Owns the single embedding model handle of the process and its
//! `UNLOADED -> LOADED -> UNLOADED` lifecycle. The handle is read-only once
//! installed; handlers clone the inner `Arc` and encode without holding the lock.

use crate::config::ServiceConfig;
use crate::embeddings::{EmbeddingError, OnnxEmbeddingModel, TextEncoder};
use anyhow::{Context, Result};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info};

/// Load state of the model handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loaded,
}

/// Holder of the process-wide embedding model handle
///
/// Constructed once in `main` and shared with the router through `AppState`.
/// Tests construct their own and install a stub encoder.
pub struct EmbeddingModelManager {
    /// Configured model identifier; static regardless of load state
    model_name: String,

    handle: RwLock<Option<Arc<dyn TextEncoder>>>,
}

impl std::fmt::Debug for EmbeddingModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModelManager")
            .field("model_name", &self.model_name)
            .field("state", &self.state())
            .finish()
    }
}

impl EmbeddingModelManager {
    /// Creates an empty (`UNLOADED`) manager for `model_name`
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            handle: RwLock::new(None),
        }
    }

    /// Loads the configured model and returns a lease that releases it on drop
    ///
    /// In test mode loading is skipped and the handle stays `UNLOADED`.
    /// Loading runs on the blocking pool: it may download weights and always
    /// builds an ONNX Runtime session. A failed call leaves the state as it was.
    pub async fn initialize(self: &Arc<Self>, config: &ServiceConfig) -> Result<ModelLease> {
        if let Some(current) = self.current() {
            return Err(EmbeddingError::AlreadyLoaded(current.model_name().to_string()).into());
        }

        if config.testing {
            info!("🧪 Test mode enabled - skipping embedding model load");
            return Ok(ModelLease {
                manager: Arc::clone(self),
            });
        }

        info!("🧠 Loading embedding model: {}", config.model_name);
        let load_config = config.clone();
        let model = tokio::task::spawn_blocking(move || OnnxEmbeddingModel::from_config(&load_config))
            .await
            .context("Embedding model load task failed")?
            .map_err(|e| {
                error!("✗ Failed to load embedding model {}: {:#}", config.model_name, e);
                EmbeddingError::LoadFailed {
                    model: config.model_name.clone(),
                    reason: format!("{:#}", e),
                }
            })?;

        self.install(Arc::new(model))?;
        Ok(ModelLease {
            manager: Arc::clone(self),
        })
    }

    /// Installs an already-built encoder (`UNLOADED -> LOADED`)
    ///
    /// There is no hot-swap: installing over a loaded handle is an error.
    pub fn install(&self, encoder: Arc<dyn TextEncoder>) -> Result<(), EmbeddingError> {
        let mut handle = self.handle.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = handle.as_ref() {
            return Err(EmbeddingError::AlreadyLoaded(current.model_name().to_string()));
        }

        info!(
            "✓ Embedding model ready: {} ({} dimensions)",
            encoder.model_name(),
            encoder.dimension()
        );
        *handle = Some(encoder);
        Ok(())
    }

    /// Clears the handle unconditionally (`LOADED -> UNLOADED`)
    pub fn shutdown(&self) {
        let mut handle = self.handle.write().unwrap_or_else(PoisonError::into_inner);
        if handle.take().is_some() {
            info!("Embedding model released: {}", self.model_name);
        }
    }

    pub fn state(&self) -> ModelState {
        if self.is_loaded() {
            ModelState::Loaded
        } else {
            ModelState::Unloaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The loaded encoder, if any
    pub fn current(&self) -> Option<Arc<dyn TextEncoder>> {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Configured model identifier
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Encodes `texts` with the loaded model
    ///
    /// An empty batch returns immediately without touching the handle. The
    /// encode call runs on tokio's blocking pool so it cannot stall other
    /// requests. Results are all-or-nothing: a count or dimension mismatch is
    /// reported as an error rather than returned partially.
    pub async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encoder = self.current().ok_or(EmbeddingError::ModelNotLoaded)?;
        let expected_dimension = encoder.dimension();
        let expected_count = texts.len();

        let embeddings = tokio::task::spawn_blocking(move || encoder.encode(&texts))
            .await
            .map_err(|e| EmbeddingError::TaskFailed(e.to_string()))??;

        if embeddings.len() != expected_count {
            return Err(EmbeddingError::CountMismatch {
                expected: expected_count,
                actual: embeddings.len(),
            });
        }
        if let Some((index, embedding)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != expected_dimension)
        {
            return Err(EmbeddingError::DimensionMismatch {
                index,
                expected: expected_dimension,
                actual: embedding.len(),
            });
        }

        Ok(embeddings)
    }
}

/// Scoped ownership of the loaded model
///
/// Dropping the lease clears the manager's handle, so the model is released
/// whether `main` returns normally, with an error, or by unwinding.
#[must_use = "dropping the lease immediately unloads the model"]
pub struct ModelLease {
    manager: Arc<EmbeddingModelManager>,
}

impl ModelLease {
    pub fn manager(&self) -> &Arc<EmbeddingModelManager> {
        &self.manager
    }
}

impl Drop for ModelLease {
    fn drop(&mut self) {
        if self.manager.is_loaded() {
            info!("Releasing embedding model {}", self.manager.model_name());
        }
        self.manager.shutdown();
    }
}
