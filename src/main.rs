// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use namuwiki_embedding_server::{
    api::{ApiServer, AppState},
    cli::Cli,
    config::ServiceConfig,
    embeddings::EmbeddingModelManager,
    version,
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.apply(ServiceConfig::from_env());
    config.validate().map_err(anyhow::Error::msg)?;

    println!("🚀 Starting Namuwiki Embedding Server...\n");
    println!("📦 BUILD VERSION: {}", version::get_version_string());
    println!("🔧 Features: {}", version::get_features_string());
    println!();
    info!(
        version = version::VERSION_NUMBER,
        features = %version::get_features_string(),
        "Starting embedding server"
    );

    println!("🧠 Embedding model: {}", config.model_name);
    if let Some(dir) = &config.model_dir {
        println!("   Model directory: {}", dir.display());
    }

    let manager = Arc::new(EmbeddingModelManager::new(config.model_name.clone()));
    // Held until shutdown; dropping it unloads the model.
    let lease = manager.initialize(&config).await?;
    if manager.is_loaded() {
        println!("✅ Embedding model loaded");
    } else {
        println!("⚠️  Test mode: model not loaded, POST /embed will return 500");
    }

    let state = Arc::new(AppState::from_config(&config, Arc::clone(&manager)));
    let server = ApiServer::new(&config.listen_addr(), state).await?;
    let addr = server.local_addr();

    println!("\n🎉 Embedding server is running!");
    println!("   POST http://{}/embed", addr);
    println!("   GET  http://{}/health", addr);
    println!("   GET  http://{}/openapi.json", addr);
    println!("   Docs redirect: {}", config.docs_redirect_url);
    println!("\nPress Ctrl+C to shutdown...");

    signal::ctrl_c().await?;

    println!("\n🛑 Shutting down...");
    server.shutdown().await;
    drop(lease);
    println!("👋 Goodbye!");

    Ok(())
}
