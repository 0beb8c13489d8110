// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::docs::{
    docs_redirect_handler, fallback_handler, landing_page_handler, openapi_handler,
    DOCS_REDIRECT_PATHS,
};
use crate::api::embed::embed_handler;
use crate::api::handlers::health_handler;
use crate::config::{ServiceConfig, DEFAULT_DOCS_REDIRECT_URL, DEFAULT_MODEL_NAME};
use crate::embeddings::EmbeddingModelManager;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub model_manager: Arc<EmbeddingModelManager>,
    pub docs_redirect_url: String,
}

impl AppState {
    pub fn new(model_manager: Arc<EmbeddingModelManager>, docs_redirect_url: impl Into<String>) -> Self {
        Self {
            model_manager,
            docs_redirect_url: docs_redirect_url.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig, model_manager: Arc<EmbeddingModelManager>) -> Self {
        Self::new(model_manager, config.docs_redirect_url.clone())
    }

    /// Unloaded manager for the default model
    pub fn new_for_test() -> Self {
        Self::new(
            Arc::new(EmbeddingModelManager::new(DEFAULT_MODEL_NAME)),
            DEFAULT_DOCS_REDIRECT_URL,
        )
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(landing_page_handler))
        .route("/embed", post(embed_handler))
        .route("/health", get(health_handler))
        .route("/openapi.json", get(openapi_handler));

    for path in DOCS_REDIRECT_PATHS {
        router = router.route(path, get(docs_redirect_handler));
    }

    router
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server running in a background task
///
/// Binding happens in [`ApiServer::new`], so a port conflict surfaces before
/// startup is reported. [`ApiServer::shutdown`] stops accepting connections
/// and waits for in-flight requests to finish.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub async fn new(listen_addr: &str, state: Arc<AppState>) -> Result<Self> {
        let addr: SocketAddr = listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", listen_addr))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let actual_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = create_app(state);

        let handle = tokio::spawn(async move {
            let serve_future = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = serve_future.await {
                error!("HTTP server error: {}", e);
            }
        });

        info!("HTTP server listening on {}", actual_addr);

        Ok(Self {
            addr: actual_addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("HTTP server task ended abnormally: {}", e);
            }
        }
        info!("HTTP server stopped");
    }
}
