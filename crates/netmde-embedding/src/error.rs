// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the embedding engine

use netmde_graph::GraphError;

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors that can occur while initializing or stepping an embedding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Embedding not initialized: call initialize() first")]
    NotInitialized,

    #[error("Unsupported embedding dimension {0} (must be 2 or 3)")]
    InvalidDimension(usize),

    #[error("Network too small to embed: {nodes} nodes, {links} links (need at least 2 nodes and 1 link)")]
    EmptyNetwork { nodes: usize, links: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Network changed since initialization: kernel has {expected} nodes, network has {actual}")]
    TopologyChanged { expected: usize, actual: usize },

    #[error("Links changed since initialization: kernel has {expected} links, network has {actual}")]
    LinksChanged { expected: usize, actual: usize },

    #[error("No link ({i}, {j}) in the embedded topology")]
    UnknownLink { i: u32, j: u32 },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EmbeddingError {
    fn from(err: serde_json::Error) -> Self {
        EmbeddingError::Serialization(err.to_string())
    }
}
