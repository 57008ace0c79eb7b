// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only frame handed to renderers: positions, links and their activations.

use netmde_graph::Network;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::metrics;

/// What a capture includes; passed explicitly on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotOptions {
    /// Recompute link activations from the current positions first
    pub refresh_activations: bool,
    /// Attach node values (`None` for nodes without one)
    pub include_values: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            refresh_activations: true,
            include_values: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub node1: u32,
    pub node2: u32,
    pub length: f64,
    pub activation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub repr_dim: usize,
    /// One `repr_dim`-vector per node, in index order
    pub positions: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Option<f64>>>,
    pub links: Vec<LinkSnapshot>,
}

impl RenderSnapshot {
    /// Capture the current state of an embedded network
    ///
    /// # Errors
    /// `NotInitialized` if the network has no positions yet.
    pub fn capture(network: &mut Network, options: &SnapshotOptions) -> EmbeddingResult<Self> {
        let repr_dim = network.repr_dim().ok_or(EmbeddingError::NotInitialized)?;
        if options.refresh_activations {
            metrics::update_activations(network)?;
        }

        let positions = network.node_positions()?;
        let values = options
            .include_values
            .then(|| network.nodes().map(|node| node.value().ok()).collect());
        let links = network
            .links()
            .map(|link| LinkSnapshot {
                node1: link.node1().0,
                node2: link.node2().0,
                length: link.length(),
                activation: link.activation(),
            })
            .collect();

        Ok(Self {
            repr_dim,
            positions,
            values,
            links,
        })
    }

    pub fn to_json(&self) -> EmbeddingResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> EmbeddingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
