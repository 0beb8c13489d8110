// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::config::ServiceConfig;
use clap::Parser;
use std::path::PathBuf;

/// Namuwiki embedding server
///
/// Flags override the matching environment variables.
#[derive(Parser, Debug, Default)]
#[command(name = "namuwiki-embedding-server")]
#[command(version)]
#[command(about = "HTTP service that embeds Namuwiki text batches", long_about = None)]
pub struct Cli {
    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides API_PORT)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Sentence-transformers model identifier (overrides EMBEDDING_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Local directory holding the ONNX export and tokenizer.json
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Skip model loading; /embed will fail until a model is installed
    #[arg(long)]
    pub testing: bool,
}

impl Cli {
    /// Applies the flags that were given on top of `config`
    pub fn apply(self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.model_name = model;
        }
        if let Some(model_dir) = self.model_dir {
            config.model_dir = Some(model_dir);
        }
        if self.testing {
            config.testing = true;
        }
        config
    }
}
