// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # netmde - minimum-distortion network embedding
//!
//! Places the nodes of a weighted network in 2D or 3D space so that the
//! Euclidean length of every link approaches its target distance.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! netmde = "0.1"
//! ```
//!
//! ```rust
//! use netmde::prelude::*;
//!
//! let adjacency = ndarray::arr2(&[
//!     [0.0, 0.8, 0.0, 0.8],
//!     [0.8, 0.0, 0.8, 0.0],
//!     [0.0, 0.8, 0.0, 0.8],
//!     [0.8, 0.0, 0.8, 0.0],
//! ]);
//! let mut net = Network::from_adjacency(LinkKind::Undirected, &adjacency)?;
//!
//! let mut engine = MdeEngine::new(Some(7));
//! engine.initialize(&mut net, 2)?;
//! let report = engine.step(&mut net, &StepParams::default())?;
//! println!("distortion after {} rounds: {}", report.rounds, report.distortion);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: per-run JSON log files next to console output
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: netmde-config, netmde-observability        │
//! │  (TOML configuration, logging)                          │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Model: netmde-graph                                    │
//! │  (Node, Link, Network, dense/sparse matrix bridge)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithm: netmde-embedding                            │
//! │  (MDE kernel and engine, distortion, activations)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use netmde_config as config;
pub use netmde_embedding as embedding;
pub use netmde_graph as graph;
pub use netmde_observability as observability;

pub use ndarray;

use netmde_config::NetmdeConfig;
use netmde_embedding::{EmbeddingResult, MdeEngine, StepParams, StepReport};
use netmde_graph::{GraphResult, LinkKind, Network};
use netmde_observability::{parse_debug_flags, LogFormat, LoggingGuard, ObservabilityConfig};
use rand::Rng;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, NetmdeConfig};
    pub use crate::embedding::{
        distance_matrix, distortion, update_activations, ConvergenceCriterion, EmbeddingError,
        EngineState, MdeEngine, RenderSnapshot, SnapshotOptions, StepParams, StepReport,
    };
    pub use crate::graph::{
        AttributeView, GraphError, Link, LinkKind, Network, Node, NodeId, SparseRow,
    };
}

/// Map the `[logging]` and `[system]` sections onto observability settings
pub fn observability_config(config: &NetmdeConfig) -> ObservabilityConfig {
    ObservabilityConfig {
        level: config.system.log_level.clone(),
        format: LogFormat::from_name(&config.logging.format),
        file_logging: config.logging.file_logging,
        log_dir: config.logging.log_dir.clone().into(),
        retention_days: config.logging.retention_days,
        retention_runs: config.logging.retention_runs,
    }
}

/// Install logging from configuration
///
/// Crates listed in `system.debug_crates` are merged with `--debug-*`
/// arguments and `NETMDE_DEBUG`.
///
/// # Errors
/// Invalid log level, log folder creation failure, or an already installed
/// global subscriber.
pub fn init_observability(config: &NetmdeConfig) -> anyhow::Result<LoggingGuard> {
    let mut flags = parse_debug_flags();
    for crate_name in &config.system.debug_crates {
        flags.enable(crate_name);
    }
    netmde_observability::init_logging(&flags, &observability_config(config))
}

/// Initialize and run one step with the `[embedding]` section of `config`
///
/// Returns the engine so the caller can keep stepping.
pub fn embed(network: &mut Network, config: &NetmdeConfig) -> EmbeddingResult<(MdeEngine, StepReport)> {
    let mut engine = MdeEngine::from_config(&config.embedding);
    engine.initialize(network, config.embedding.repr_dim)?;
    let report = engine.step(network, &StepParams::from(&config.embedding))?;
    tracing::info!(
        "embedded {} nodes in R{}: distortion = {:.6}",
        network.size(),
        config.embedding.repr_dim,
        report.distortion
    );
    Ok((engine, report))
}

/// Random network of `n` nodes using the `[random_network]` section of `config`
pub fn random_network<R: Rng + ?Sized>(
    config: &NetmdeConfig,
    kind: LinkKind,
    n: usize,
    rng: &mut R,
) -> GraphResult<Network> {
    Network::random(
        kind,
        n,
        config.random_network.connection_probability,
        config.random_network.max_dist,
        rng,
    )
}
