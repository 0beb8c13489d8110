// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence-transformers checkpoint exported to ONNX
//! (paraphrase-multilingual-MiniLM-L12-v2 by default).
//!
//! Features:
//! - model.onnx / tokenizer.json from a local directory or the Hugging Face Hub
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenizer truncation to the model's max sequence length
//! - Batch inference with attention-masked mean pooling

use crate::config::ServiceConfig;
use crate::embeddings::{EmbeddingError, TextEncoder};
use anyhow::{Context, Result};
use hf_hub::api::sync::Api;
use ndarray::{Array2, ArrayView2, Axis, Ix2};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// ONNX-based sentence embedding model
///
/// The exported graph outputs token-level embeddings `[batch, seq_len, hidden]`;
/// sentence vectors are the attention-masked mean over `seq_len`, which is the
/// pooling sentence-transformers configures for this model family.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session (run() needs &mut, so it sits behind a Mutex)
    session: Arc<Mutex<Session>>,

    tokenizer: Arc<Tokenizer>,

    model_name: String,

    dimension: usize,

    max_length: usize,

    /// XLM-R exports omit token_type_ids, BERT exports require it
    uses_token_type_ids: bool,

    /// Id written into padded positions (`<pad>` is 1 for XLM-R, 0 for BERT)
    pad_id: i64,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("uses_token_type_ids", &self.uses_token_type_ids)
            .field("pad_id", &self.pad_id)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Resolves the model files for `config` and loads them
    ///
    /// Blocking: may download from the Hub and always builds an ONNX session.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let (model_path, tokenizer_path) =
            resolve_model_files(&config.model_name, config.model_dir.as_deref())?;

        Self::new(
            config.model_name.clone(),
            model_path,
            tokenizer_path,
            config.dimensions,
            config.max_sequence_length,
            config.intra_threads,
        )
    }

    /// Creates a new ONNX embedding model from disk paths
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - The validation inference does not produce `dimension`-sized vectors
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        dimension: usize,
        max_length: usize,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("🚀 Initializing ONNX embedding model: {}", model_name);

        // Try CUDA first, fall back to CPU if unavailable
        info!("   Attempting CUDA execution provider...");
        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path);

        let session = match cuda_result {
            Ok(s) => {
                info!("✅ CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {}", e);
                warn!("   Falling back to CPU execution provider");
                Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(intra_threads)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .context(format!(
                        "Failed to load ONNX model from {}",
                        model_path.display()
                    ))?
            }
        };

        let input_names: Vec<_> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        debug!("Embedding model inputs: {:?}", input_names);
        let uses_token_type_ids = input_names.contains(&"token_type_ids");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        let pad_id = pad_token_id(&tokenizer);
        debug!("Embedding model pad id: {}", pad_id);
        // Padding is applied per batch in embed_batch
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
            max_length,
            uses_token_type_ids,
            pad_id,
        };

        // Validation inference: fails fast on a graph with the wrong hidden size
        let probe = model
            .embed_batch(&["validation test".to_string()])
            .context("Validation inference failed")?;
        if probe.first().map(Vec::len) != Some(dimension) {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {:?} (expected {})",
                probe.first().map(Vec::len),
                dimension
            );
        }

        info!(
            "✅ ONNX embedding model loaded ({} dimensions, max {} tokens)",
            model.dimension, model.max_length
        );

        Ok(model)
    }

    /// Generates embeddings for multiple texts in one inference call
    ///
    /// Tokenizes all texts, pads to the longest sequence, runs the session
    /// once and mean-pools each row with its attention mask.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings: Vec<Encoding> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids_batch = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask_batch = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let padding_needed = max_len - ids.len();

            input_ids_batch.extend(ids.iter().map(|&id| id as i64));
            input_ids_batch.extend(std::iter::repeat(self.pad_id).take(padding_needed));
            attention_mask_batch.extend(mask.iter().map(|&m| m as i64));
            attention_mask_batch.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let input_ids_array = Array2::from_shape_vec((texts.len(), max_len), input_ids_batch)
            .context("Failed to create batch input_ids array")?;
        let attention_mask_array =
            Array2::from_shape_vec((texts.len(), max_len), attention_mask_batch)
                .context("Failed to create batch attention_mask array")?;

        let mut inputs = ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array.clone())?
        ];
        if self.uses_token_type_ids {
            let token_type_ids_array = Array2::<i64>::zeros((texts.len(), max_len));
            inputs.push((
                "token_type_ids".into(),
                Value::from_array(token_type_ids_array)?.into(),
            ));
        }

        let mut session_guard = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("ONNX session lock poisoned"))?;
        let outputs = session_guard.run(inputs)?;

        // Index [0]: output names differ between exports
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        if output_array.ndim() != 3 {
            anyhow::bail!(
                "Model outputs unexpected shape: {:?} (expected [batch, seq_len, hidden])",
                output_array.shape()
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_idx, mask_row) in attention_mask_array.axis_iter(Axis(0)).enumerate() {
            let token_embeddings = output_array
                .index_axis(Axis(0), batch_idx)
                .into_dimensionality::<Ix2>()
                .context("Failed to view token embeddings")?;
            let mask: Vec<i64> = mask_row.to_vec();
            embeddings.push(mean_pool(token_embeddings, &mask));
        }

        Ok(embeddings)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl TextEncoder for OnnxEmbeddingModel {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(self.embed_batch(texts)?)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Pad token id from the tokenizer's padding config or vocabulary, 0 if it has neither
fn pad_token_id(tokenizer: &Tokenizer) -> i64 {
    tokenizer
        .get_padding()
        .map(|padding| padding.pad_id)
        .or_else(|| tokenizer.token_to_id("<pad>"))
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .map(i64::from)
        .unwrap_or(0)
}

/// Averages token embeddings `[seq_len, hidden]` over positions whose mask is 1
pub(crate) fn mean_pool(token_embeddings: ArrayView2<f32>, attention_mask: &[i64]) -> Vec<f32> {
    let hidden_dim = token_embeddings.ncols();
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (row, &mask) in token_embeddings.outer_iter().zip(attention_mask) {
        let mask_value = mask as f32;
        sum_mask += mask_value;
        for (acc, &value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * mask_value;
        }
    }

    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }

    pooled
}

/// Finds model.onnx and tokenizer.json for `model_name`
///
/// A local `model_dir` wins; otherwise the files come from the Hugging Face
/// Hub cache (downloaded on first use).
fn resolve_model_files(model_name: &str, model_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    if let Some(dir) = model_dir {
        info!("Using local model directory: {}", dir.display());
        let model_path = ["model.onnx", "onnx/model.onnx"]
            .iter()
            .map(|f| dir.join(f))
            .find(|p| p.exists())
            .with_context(|| format!("No ONNX model found in {}", dir.display()))?;
        let tokenizer_path = dir.join("tokenizer.json");
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        return Ok((model_path, tokenizer_path));
    }

    info!("Fetching {} from Hugging Face Hub", model_name);
    let api = Api::new().context("Failed to create Hugging Face Hub client")?;
    let repo = api.model(model_name.to_string());

    let model_path = repo
        .get("onnx/model.onnx")
        .or_else(|_| repo.get("model.onnx"))
        .with_context(|| format!("No ONNX export found for {}", model_name))?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .with_context(|| format!("No tokenizer.json found for {}", model_name))?;

    Ok((model_path, tokenizer_path))
}
