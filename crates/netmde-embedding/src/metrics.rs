// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Distortion and activation diagnostics.

Everything here reads node positions and recomputes distances on demand;
nothing is cached across position updates. The only write is
[`update_activations`], which stores the per-link stress signal.
*/

use ndarray::{Array2, ArrayView1};
use netmde_graph::{LinkKind, Network, SparseRow};

use crate::error::EmbeddingResult;

#[inline]
pub(crate) fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Dense `N x N` Euclidean distances between the rows of `positions`
pub fn pairwise_distances(positions: &Array2<f64>) -> Array2<f64> {
    let n = positions.nrows();
    let mut distances = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(positions.row(i), positions.row(j));
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

/// `distanceM`: current pairwise distances of every node
pub fn distance_matrix(network: &Network) -> EmbeddingResult<Array2<f64>> {
    Ok(pairwise_distances(&network.positions()?))
}

/// Actual distance of every linked pair, ordered by `(i, j)`
///
/// Distances are symmetric, so undirected networks report `i < j` only;
/// directed networks report every linked orientation.
pub fn distance_sparse(network: &Network) -> EmbeddingResult<Vec<SparseRow>> {
    let distances = distance_matrix(network)?;
    let rows = network
        .link_matrix()
        .indexed_iter()
        .filter(|((i, j), linked)| {
            **linked && (network.kind() == LinkKind::Directed || i < j)
        })
        .map(|((i, j), _)| SparseRow::new(i as u32, j as u32, distances[[i, j]]))
        .collect();
    Ok(rows)
}

/// `Σ (targetM − distanceM)²` over every `linkM` entry
///
/// Undirected links appear twice in `linkM` and are counted twice.
pub fn total_distortion(network: &Network) -> EmbeddingResult<f64> {
    let distances = distance_matrix(network)?;
    let total = network
        .link_matrix()
        .indexed_iter()
        .filter(|(_, linked)| **linked)
        .map(|(index, _)| {
            let error = network.target_matrix()[index] - distances[index];
            error * error
        })
        .sum();
    Ok(total)
}

/// [`total_distortion`] divided by the node count
pub fn distortion(network: &Network) -> EmbeddingResult<f64> {
    let total = total_distortion(network)?;
    Ok(match network.size() {
        0 => 0.0,
        n => total / n as f64,
    })
}

/// `tanh((actual − target) / target)`: positive when stretched, negative when compressed
#[inline]
pub fn link_activation(actual: f64, target: f64) -> f64 {
    ((actual - target) / target).tanh()
}

/// Recompute and store the activation of every link
pub fn update_activations(network: &mut Network) -> EmbeddingResult<()> {
    let positions = network.positions()?;
    for link in network.links_mut() {
        let actual = euclidean(
            positions.row(link.node1().index()),
            positions.row(link.node2().index()),
        );
        let activation = link_activation(actual, link.length());
        link.set_activation(activation);
    }
    Ok(())
}
