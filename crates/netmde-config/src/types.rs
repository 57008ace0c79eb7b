// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Every struct maps to a section of `netmde_configuration.toml`. All sections
//! and fields are optional in the file; missing ones take the defaults below.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetmdeConfig {
    pub system: SystemConfig,
    pub embedding: EmbeddingConfig,
    pub random_network: RandomNetworkConfig,
    pub logging: LoggingConfig,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Default log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Crates logged at debug level regardless of `log_level`
    pub debug_crates: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

/// Minimum-distortion embedding parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding dimensionality (2 or 3)
    pub repr_dim: usize,
    /// Rounds per `step` call
    pub n_iterations: usize,
    pub attraction_step: f64,
    pub repulsion_step: f64,
    /// Repulsion rounds allowed per `step` call
    pub max_repulsion_iterations: usize,
    /// Negative sampling step, 0 disables negative sampling
    pub negative_step: f64,
    /// Fraction of the network sampled as non-neighbours per node
    pub negative_fraction: f64,
    /// Seed for initial positions and sampling; entropy when absent
    pub seed: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            repr_dim: 2,
            n_iterations: 1000,
            attraction_step: 0.1,
            repulsion_step: 0.05,
            max_repulsion_iterations: 100,
            negative_step: 0.0,
            negative_fraction: 0.1,
            seed: None,
        }
    }
}

/// Random network generator defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RandomNetworkConfig {
    pub connection_probability: f64,
    pub max_dist: f64,
}

impl Default for RandomNetworkConfig {
    fn default() -> Self {
        Self {
            connection_probability: 0.15,
            max_dist: 1.0,
        }
    }
}

/// Logging output configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console format: "text" or "json"
    pub format: String,
    /// Write per-run log files (needs the `file-logging` observability feature)
    pub file_logging: bool,
    pub log_dir: String,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            file_logging: false,
            log_dir: "./logs".to_string(),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
