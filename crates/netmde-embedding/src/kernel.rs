// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Embedding kernels.

A kernel owns its own copy of the topology (adjacency lists with target
distances) and the position buffer. The engine feeds it sparse triplets once,
runs it, and copies positions back into the [`Network`](netmde_graph::Network).

## Round structure ([`NativeKernel`])

```text
for round in 0..n_iterations
    repulsion       (while repulsion budget > 0, Jacobi update on a snapshot)
    for node i
        attraction  (in place, sees updates of nodes < i)
        negative    (if negative_step > 0)
recenter
```
*/

use ahash::AHashMap;
use ndarray::{Array1, Array2, Axis, Zip};
use netmde_graph::{GraphError, LinkKey, LinkKind, NodeId, SparseRow, SUPPORTED_DIMENSIONS};
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::metrics::{euclidean, pairwise_distances};
use crate::params::StepParams;

/// Counters of one kernel run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelRun {
    pub rounds: usize,
    pub repulsion_rounds: usize,
    /// Pair updates skipped because both positions coincided
    pub coincident_pairs: usize,
}

/// Contract between the engine and a position-updating kernel
pub trait EmbeddingKernel {
    /// Build the topology from triplets over nodes `0..values.len()` and draw
    /// initial positions uniformly in `[0, 1)^repr_dim`
    fn init(
        &mut self,
        kind: LinkKind,
        triplets: &[SparseRow],
        values: &[Option<f64>],
        repr_dim: usize,
        rng: &mut dyn RngCore,
    ) -> EmbeddingResult<()>;

    /// Run the update rounds described by `params`
    fn run(&mut self, params: &StepParams, rng: &mut dyn RngCore) -> EmbeddingResult<KernelRun>;

    /// Replace the target distance of already known links
    fn set_target(&mut self, triplets: &[SparseRow]) -> EmbeddingResult<()>;

    /// `N x repr_dim` positions, authoritative after every run
    fn positions(&self) -> &Array2<f64>;

    fn distance_matrix(&self) -> Array2<f64>;

    /// Squared distance error summed over the link matrix, divided by `N`
    ///
    /// Undirected links count once per orientation, directed links once.
    fn distortion(&self) -> f64;

    fn node_count(&self) -> usize {
        self.positions().nrows()
    }
}

/// In-crate repulsion/attraction kernel
#[derive(Debug, Clone, Default)]
pub struct NativeKernel {
    positions: Array2<f64>,
    /// Per node: (neighbour, target distance), both orientations of every link
    adjacency: Vec<Vec<(usize, f64)>>,
    values: Vec<Option<f64>>,
    /// One (from, to, target) entry per link as given to `init`
    links: Vec<(usize, usize, f64)>,
    link_index: AHashMap<LinkKey, usize>,
    directed: bool,
}

impl NativeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node payloads as handed to `init`
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn neighbours(&self, node: usize) -> &[(usize, f64)] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    fn set_neighbour(&mut self, node: usize, neighbour: usize, target: f64) {
        let list = &mut self.adjacency[node];
        match list.iter_mut().find(|(other, _)| *other == neighbour) {
            Some(entry) => entry.1 = target,
            None => list.push((neighbour, target)),
        }
    }

    fn kind(&self) -> LinkKind {
        if self.directed {
            LinkKind::Directed
        } else {
            LinkKind::Undirected
        }
    }

    fn link_key(&self, i: u32, j: u32) -> LinkKey {
        LinkKey::new(self.kind(), NodeId(i), NodeId(j))
    }

    fn is_neighbour(&self, node: usize, other: usize) -> bool {
        self.adjacency[node].iter().any(|(n, _)| *n == other)
    }

    #[inline]
    fn distance(&self, a: usize, b: usize) -> f64 {
        euclidean(self.positions.row(a), self.positions.row(b))
    }

    /// One Jacobi repulsion round; returns the number of coincident pairs
    fn repulse(&mut self, step: f64) -> usize {
        let n = self.positions.nrows();
        let snapshot = self.positions.clone();
        let scale = step / n as f64;
        let mut coincident = 0;

        let mut delta = Array1::<f64>::zeros(snapshot.ncols());
        for i in 0..n {
            delta.fill(0.0);
            let from = snapshot.row(i);
            for j in 0..n {
                if j == i {
                    continue;
                }
                let other = snapshot.row(j);
                let d = euclidean(from, other);
                if d == 0.0 {
                    if j > i {
                        coincident += 1;
                    }
                    continue;
                }
                Zip::from(&mut delta)
                    .and(from)
                    .and(other)
                    .for_each(|acc, &a, &b| *acc += (a - b) / d);
            }
            self.positions.row_mut(i).scaled_add(scale, &delta);
        }
        coincident
    }

    /// Move `node` towards the target distance of each neighbour
    fn attract(&mut self, node: usize, step: f64) -> usize {
        let degree = self.adjacency[node].len();
        if degree == 0 {
            return 0;
        }
        let mut delta = Array1::<f64>::zeros(self.positions.ncols());
        let mut coincident = 0;

        for &(child, target) in &self.adjacency[node] {
            let d = self.distance(node, child);
            if d == 0.0 {
                coincident += 1;
                continue;
            }
            let weight = 1.0 - target / d;
            Zip::from(&mut delta)
                .and(self.positions.row(child))
                .and(self.positions.row(node))
                .for_each(|acc, &c, &p| *acc += weight * (c - p));
        }
        self.positions
            .row_mut(node)
            .scaled_add(step / degree as f64, &delta);
        coincident
    }

    /// Push `node` away from randomly drawn non-neighbours
    fn push_from_non_neighbours(
        &mut self,
        node: usize,
        params: &StepParams,
        rng: &mut dyn RngCore,
    ) -> usize {
        let n = self.positions.nrows();
        let samples = (params.negative_fraction * n as f64).floor() as usize;
        let mut coincident = 0;

        for _ in 0..samples {
            // Give up after N draws (dense neighbourhoods may have no candidate)
            let candidate = (0..n)
                .map(|_| rng.gen_range(0..n))
                .find(|&other| other != node && !self.is_neighbour(node, other));
            let Some(other) = candidate else {
                continue;
            };
            let d = self.distance(node, other);
            if d == 0.0 {
                coincident += 1;
                continue;
            }
            let weight = params.negative_step / (d * d);
            for axis in 0..self.positions.ncols() {
                let away = self.positions[[node, axis]] - self.positions[[other, axis]];
                self.positions[[node, axis]] += weight * away;
            }
        }
        coincident
    }

    /// Subtract the centroid from every position
    fn recenter(&mut self) {
        if let Some(centroid) = self.positions.mean_axis(Axis(0)) {
            self.positions -= &centroid;
        }
    }
}

impl EmbeddingKernel for NativeKernel {
    fn init(
        &mut self,
        kind: LinkKind,
        triplets: &[SparseRow],
        values: &[Option<f64>],
        repr_dim: usize,
        rng: &mut dyn RngCore,
    ) -> EmbeddingResult<()> {
        if !SUPPORTED_DIMENSIONS.contains(&repr_dim) {
            return Err(EmbeddingError::InvalidDimension(repr_dim));
        }
        let n = values.len();
        if n < 2 || triplets.is_empty() {
            return Err(EmbeddingError::EmptyNetwork {
                nodes: n,
                links: triplets.len(),
            });
        }

        self.directed = kind == LinkKind::Directed;
        self.adjacency = vec![Vec::new(); n];
        self.links.clear();
        self.link_index.clear();
        for row in triplets {
            let (i, j) = (row.i as usize, row.j as usize);
            if i >= n || j >= n || i == j {
                return Err(GraphError::InvalidTopology(format!(
                    "link ({}, {}) outside nodes 0..{}",
                    row.i, row.j, n
                ))
                .into());
            }
            if !(row.distance.is_finite() && row.distance > 0.0) {
                return Err(GraphError::InvalidDistance {
                    i: row.i,
                    j: row.j,
                    distance: row.distance,
                }
                .into());
            }
            self.set_neighbour(i, j, row.distance);
            self.set_neighbour(j, i, row.distance);
            let key = self.link_key(row.i, row.j);
            match self.link_index.get(&key) {
                Some(&slot) => self.links[slot].2 = row.distance,
                None => {
                    self.link_index.insert(key, self.links.len());
                    self.links.push((i, j, row.distance));
                }
            }
        }
        self.values = values.to_vec();
        self.positions = Array2::from_shape_fn((n, repr_dim), |_| rng.gen::<f64>());

        debug!(
            "kernel initialized: {} nodes, {} links, R{}",
            n,
            self.links.len(),
            repr_dim
        );
        Ok(())
    }

    fn run(&mut self, params: &StepParams, rng: &mut dyn RngCore) -> EmbeddingResult<KernelRun> {
        if self.adjacency.is_empty() {
            return Err(EmbeddingError::NotInitialized);
        }
        params.validate()?;
        let n = self.positions.nrows();
        let mut budget = params.max_repulsion_iterations;
        let mut report = KernelRun::default();

        for _ in 0..params.n_iterations {
            if budget > 0 {
                report.coincident_pairs += self.repulse(params.repulsion_step);
                report.repulsion_rounds += 1;
                budget -= 1;
            }
            for node in 0..n {
                report.coincident_pairs += self.attract(node, params.attraction_step);
                if params.negative_step > 0.0 {
                    report.coincident_pairs += self.push_from_non_neighbours(node, params, rng);
                }
            }
            report.rounds += 1;
        }
        self.recenter();

        if self.positions.iter().any(|x| !x.is_finite()) {
            warn!("non-finite positions after {} rounds: the embedding diverged", report.rounds);
        }
        Ok(report)
    }

    fn set_target(&mut self, triplets: &[SparseRow]) -> EmbeddingResult<()> {
        for row in triplets {
            if !self.link_index.contains_key(&self.link_key(row.i, row.j)) {
                return Err(EmbeddingError::UnknownLink { i: row.i, j: row.j });
            }
            if !(row.distance.is_finite() && row.distance > 0.0) {
                return Err(GraphError::InvalidDistance {
                    i: row.i,
                    j: row.j,
                    distance: row.distance,
                }
                .into());
            }
        }
        for row in triplets {
            let (i, j) = (row.i as usize, row.j as usize);
            self.set_neighbour(i, j, row.distance);
            self.set_neighbour(j, i, row.distance);
            if let Some(&slot) = self.link_index.get(&self.link_key(row.i, row.j)) {
                self.links[slot].2 = row.distance;
            }
        }
        Ok(())
    }

    fn positions(&self) -> &Array2<f64> {
        &self.positions
    }

    fn distance_matrix(&self) -> Array2<f64> {
        pairwise_distances(&self.positions)
    }

    fn distortion(&self) -> f64 {
        let n = self.positions.nrows();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = self
            .links
            .iter()
            .map(|&(from, to, target)| {
                let error = self.distance(from, to) - target;
                error * error
            })
            .sum();
        let orientations = if self.directed { 1.0 } else { 2.0 };
        orientations * total / n as f64
    }
}
