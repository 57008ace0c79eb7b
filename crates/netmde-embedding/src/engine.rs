// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# MDE engine

Drives an [`EmbeddingKernel`] against a [`Network`]:

```text
Uninitialized --initialize--> Initialized --step--> Converging --settle--> Stable
                                                       ^   |
                                                       +---+ step
```

The engine never decides on its own that an embedding has converged. A caller
that wants to stop early polls [`MdeEngine::distortion`] (or uses
[`ConvergenceCriterion`](crate::ConvergenceCriterion)) and calls
[`MdeEngine::settle`].
*/

use std::fmt;

use netmde_config::EmbeddingConfig;
use netmde_graph::{GraphError, Network, SUPPORTED_DIMENSIONS};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::kernel::{EmbeddingKernel, NativeKernel};
use crate::metrics;
use crate::params::StepParams;
use crate::rng::make_rng;

/// Lifecycle of an embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Converging,
    Stable,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initialized => "initialized",
            EngineState::Converging => "converging",
            EngineState::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// Outcome of one [`MdeEngine::step`] call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub rounds: usize,
    pub repulsion_rounds: usize,
    pub coincident_pairs: usize,
    /// Distortion of the network after the step
    pub distortion: f64,
}

/// Minimum-distortion embedding engine
pub struct MdeEngine<K: EmbeddingKernel = NativeKernel> {
    kernel: K,
    state: EngineState,
    rng: StdRng,
    /// Link count the kernel was initialized with
    links: usize,
}

impl MdeEngine<NativeKernel> {
    /// Engine with the in-crate kernel; `None` seeds from OS entropy
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_kernel(NativeKernel::new(), seed)
    }

    /// Engine seeded from `config.seed`
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(config.seed)
    }
}

impl<K: EmbeddingKernel> MdeEngine<K> {
    pub fn with_kernel(kernel: K, seed: Option<u64>) -> Self {
        Self {
            kernel,
            state: EngineState::Uninitialized,
            rng: make_rng(seed),
            links: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Draw random initial positions and copy them into `network`
    ///
    /// May be called again to restart from fresh positions with the same
    /// dimension. A failed call leaves the engine and the network untouched.
    ///
    /// # Errors
    /// * `InvalidDimension` unless `repr_dim` is 2 or 3
    /// * `Graph(DimensionMismatch)` if `network` already holds positions of another dimension
    /// * `Graph(IndexGap)` if the node indices are not contiguous
    /// * `EmptyNetwork` with fewer than 2 nodes or no link
    pub fn initialize(&mut self, network: &mut Network, repr_dim: usize) -> EmbeddingResult<()> {
        if !SUPPORTED_DIMENSIONS.contains(&repr_dim) {
            return Err(EmbeddingError::InvalidDimension(repr_dim));
        }
        if let Some(current) = network.repr_dim() {
            if current != repr_dim {
                return Err(GraphError::DimensionMismatch {
                    expected: current,
                    actual: repr_dim,
                }
                .into());
            }
        }
        network.check_contiguous()?;
        if network.size() < 2 || network.link_count() == 0 {
            return Err(EmbeddingError::EmptyNetwork {
                nodes: network.size(),
                links: network.link_count(),
            });
        }

        let values: Vec<Option<f64>> = network.nodes().map(|node| node.value().ok()).collect();
        self.kernel.init(
            network.kind(),
            &network.target_sparse(),
            &values,
            repr_dim,
            &mut self.rng,
        )?;
        network.write_positions(self.kernel.positions())?;
        self.links = network.link_count();
        self.state = EngineState::Initialized;

        info!(
            "Embedding initialized in R{}: {} nodes, {} links",
            repr_dim,
            network.size(),
            network.link_count()
        );
        Ok(())
    }

    /// Run `params.n_iterations` rounds and copy the new positions into `network`
    ///
    /// The repulsion budget restarts at `params.max_repulsion_iterations` on
    /// every call.
    ///
    /// # Errors
    /// * `NotInitialized` before [`initialize`](Self::initialize)
    /// * `TopologyChanged` if nodes were added since initialization
    /// * `LinksChanged` if links were added between known nodes
    /// * `InvalidParameter` for invalid step sizes
    pub fn step(&mut self, network: &mut Network, params: &StepParams) -> EmbeddingResult<StepReport> {
        self.ensure_initialized()?;
        self.ensure_same_topology(network)?;
        if network.link_count() != self.links {
            return Err(EmbeddingError::LinksChanged {
                expected: self.links,
                actual: network.link_count(),
            });
        }
        params.validate()?;

        let run = self.kernel.run(params, &mut self.rng)?;
        network.write_positions(self.kernel.positions())?;
        let distortion = metrics::distortion(network)?;
        self.state = EngineState::Converging;

        if run.coincident_pairs > 0 {
            warn!(
                "{} coincident position pairs skipped during {} rounds",
                run.coincident_pairs, run.rounds
            );
        }
        debug!(
            "step: {} rounds ({} with repulsion), distortion = {:.6}",
            run.rounds, run.repulsion_rounds, distortion
        );

        Ok(StepReport {
            rounds: run.rounds,
            repulsion_rounds: run.repulsion_rounds,
            coincident_pairs: run.coincident_pairs,
            distortion,
        })
    }

    /// Push the current link lengths of `network` into the kernel
    ///
    /// Topology stays as initialized; only target distances change.
    ///
    /// # Errors
    /// `UnknownLink` if `network` holds a link the kernel was not initialized with.
    pub fn set_target(&mut self, network: &Network) -> EmbeddingResult<()> {
        self.ensure_initialized()?;
        self.ensure_same_topology(network)?;
        self.kernel.set_target(&network.target_sparse())?;
        debug!("target distances replaced for {} links", network.link_count());
        Ok(())
    }

    /// Distortion of the network's current positions
    pub fn distortion(&self, network: &Network) -> EmbeddingResult<f64> {
        self.ensure_initialized()?;
        metrics::distortion(network)
    }

    /// Mark the embedding as stable; a later `step` resumes converging
    pub fn settle(&mut self) -> EmbeddingResult<()> {
        self.ensure_initialized()?;
        self.state = EngineState::Stable;
        info!("Embedding marked stable");
        Ok(())
    }

    fn ensure_initialized(&self) -> EmbeddingResult<()> {
        match self.state {
            EngineState::Uninitialized => Err(EmbeddingError::NotInitialized),
            _ => Ok(()),
        }
    }

    fn ensure_same_topology(&self, network: &Network) -> EmbeddingResult<()> {
        let expected = self.kernel.node_count();
        if network.size() != expected {
            return Err(EmbeddingError::TopologyChanged {
                expected,
                actual: network.size(),
            });
        }
        Ok(())
    }
}

impl<K: EmbeddingKernel> fmt::Debug for MdeEngine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MdeEngine")
            .field("state", &self.state)
            .field("nodes", &self.kernel.node_count())
            .finish()
    }
}
