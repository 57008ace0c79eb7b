// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# netmde embedding engine

Iterative minimum-distortion embedding of a [`Network`](netmde_graph::Network)
into R2 or R3: node positions are moved so that the Euclidean distance of
every link approaches its target length.

## Algorithm

Each round of [`MdeEngine::step`]:
1. **Repulsion** (first `max_repulsion_iterations` rounds of a call): every
   node is pushed away from every other node, spreading overlapping regions
2. **Attraction**: every node moves towards the target distance of its
   neighbours, averaged over its degree
3. **Negative sampling** (optional): random non-neighbours are pushed apart

After the last round the embedding is re-centred on the origin.

## Example

```rust
use netmde_embedding::{MdeEngine, StepParams};
use netmde_graph::{LinkKind, Network};

let mut net = Network::complete(LinkKind::Undirected, 3, 1.0).unwrap();
let mut engine = MdeEngine::new(Some(42));
engine.initialize(&mut net, 2).unwrap();
let report = engine.step(&mut net, &StepParams::attraction_only(2000, 0.1)).unwrap();
assert!(report.distortion < 1e-6);
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod convergence;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod metrics;
pub mod params;
pub mod rng;
pub mod snapshot;

pub use convergence::{step_until, ConvergenceCriterion};
pub use engine::{EngineState, MdeEngine, StepReport};
pub use error::{EmbeddingError, EmbeddingResult};
pub use kernel::{EmbeddingKernel, KernelRun, NativeKernel};
pub use metrics::{
    distance_matrix, distance_sparse, distortion, link_activation, total_distortion,
    update_activations,
};
pub use params::StepParams;
pub use snapshot::{LinkSnapshot, RenderSnapshot, SnapshotOptions};
