// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# netmde graph model

Weighted graphs whose links carry a target distance, plus the bridge between
dense adjacency matrices, sparse `(i, j, distance)` triplets and the model.

## Model

- [`Node`]: integer identity, optional embedding position, optional scalar value
- [`Link`]: undirected (`L(a,b) == L(b,a)`) or directed, with target length and activation
- [`Network`]: nodes, link arena and the dense `linkM` / `targetM` matrices

Nodes and links refer to each other through [`NodeId`] / [`LinkId`] indices;
the [`Network`] owns both.

## Example

```rust
use netmde_graph::{LinkKind, Network, SparseRow};

let triplets = [SparseRow::new(0, 1, 0.8), SparseRow::new(1, 2, 0.8)];
let net = Network::from_sparse(LinkKind::Undirected, &triplets).unwrap();
assert_eq!(net.size(), 3);
assert_eq!(net.target_matrix()[[2, 1]], 0.8);
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attribute;
mod builders;
pub mod error;
pub mod ids;
pub mod knn;
pub mod link;
pub mod matrix;
pub mod network;
pub mod node;

pub use attribute::AttributeView;
pub use error::{GraphError, GraphResult};
pub use ids::{LinkId, NodeId};
pub use knn::knn_triplets;
pub use link::{Link, LinkKey, LinkKind};
pub use matrix::{remap_contiguous, to_sparse, to_sparse_full, validate_adjacency, SparseRow};
pub use network::{Network, NodeIter, SUPPORTED_DIMENSIONS};
pub use node::Node;
