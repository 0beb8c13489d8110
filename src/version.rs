// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Namuwiki embedding server

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-onnx-embeddings-2025-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "onnx-runtime",
    "cuda-fallback-cpu",
    "mean-pooling",
    "hf-hub-download",
    "test-mode",
    "graceful-shutdown",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} ({})", VERSION, BUILD_DATE)
}

/// Comma-separated feature list for the startup banner
pub fn get_features_string() -> String {
    FEATURES.join(", ")
}
