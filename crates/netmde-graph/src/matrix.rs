// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Matrix bridge: dense adjacency matrices, sparse `(i, j, distance)` triplets
and the graph model.

```text
dense adjacency --validate_adjacency--> to_sparse --> from_sparse --> Network
                                                         ^
                                   triplets ------------/
```
*/

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GraphError, GraphResult};
use crate::ids::NodeId;
use crate::link::{check_distance, Link, LinkKind};
use crate::network::Network;

/// One row of the sparse triplet form: link `i -> j` at `distance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparseRow {
    pub i: u32,
    pub j: u32,
    pub distance: f64,
}

impl SparseRow {
    pub fn new(i: u32, j: u32, distance: f64) -> Self {
        Self { i, j, distance }
    }
}

impl From<(u32, u32, f64)> for SparseRow {
    fn from((i, j, distance): (u32, u32, f64)) -> Self {
        Self { i, j, distance }
    }
}

impl Network {
    /// Build a network from sparse triplets
    ///
    /// `N` is `max(index) + 1`; indices need not be contiguous (see
    /// [`remap_contiguous`]). Repeated rows for the same pair overwrite the
    /// previous distance; for undirected networks `(i, j)` and `(j, i)` are
    /// the same pair.
    ///
    /// # Errors
    /// `InvalidDistance` for non-finite or non-positive distances,
    /// `InvalidEndpoint` for `i == j`.
    pub fn from_sparse(kind: LinkKind, triplets: &[SparseRow]) -> GraphResult<Self> {
        Self::from_sparse_sized(kind, triplets, 0)
    }

    /// Like [`from_sparse`](Self::from_sparse) but registers at least nodes `0..min_size`
    pub(crate) fn from_sparse_sized(
        kind: LinkKind,
        triplets: &[SparseRow],
        min_size: usize,
    ) -> GraphResult<Self> {
        // Validate everything before touching the network
        for row in triplets {
            check_distance(NodeId(row.i), NodeId(row.j), row.distance)?;
        }

        let mut net = Network::new(kind);
        let size = triplets
            .iter()
            .map(|row| row.i.max(row.j) as usize + 1)
            .max()
            .unwrap_or(0)
            .max(min_size);
        net.ensure_size(size);
        net.add_nodes(min_size);

        let mut conflicts = 0usize;
        for row in triplets {
            let (a, b) = (NodeId(row.i), NodeId(row.j));
            let previous = net
                .find_link(a, b)
                .and_then(|id| net.link(id))
                .map(Link::length);
            if previous.is_some_and(|length| length != row.distance) {
                conflicts += 1;
            }
            net.connect(a, b, row.distance)?;
        }
        if conflicts > 0 {
            warn!(
                "{} sparse rows redefined an existing link (last distance wins)",
                conflicts
            );
        }

        info!(
            "Network has {} elements and {} links (density = {:.1} %)",
            net.node_count(),
            net.link_count(),
            100.0 * net.density()
        );
        Ok(net)
    }

    /// Build a network from a dense adjacency matrix
    ///
    /// The matrix must be square, symmetric and have a null diagonal; a
    /// non-zero `M[i,j]` is a link of length `M[i,j]`. Undirected networks
    /// take the upper triangle, directed networks get both orientations of
    /// every pair. Every row of the matrix becomes a node, isolated or not.
    ///
    /// # Errors
    /// `Shape`, `Asymmetry`, `NonZeroDiagonal`, then anything
    /// [`from_sparse`](Self::from_sparse) reports.
    pub fn from_adjacency(kind: LinkKind, matrix: &Array2<f64>) -> GraphResult<Self> {
        validate_adjacency(matrix)?;
        let triplets = match kind {
            LinkKind::Undirected => to_sparse(matrix),
            LinkKind::Directed => to_sparse_full(matrix),
        };
        Self::from_sparse_sized(kind, &triplets, matrix.nrows())
    }

    /// [`from_adjacency`](Self::from_adjacency) for row-major nested vectors
    ///
    /// # Errors
    /// `Shape` for ragged or non-square input.
    pub fn from_adjacency_rows(kind: LinkKind, rows: &[Vec<f64>]) -> GraphResult<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != n) {
            return Err(GraphError::Shape {
                rows: n,
                cols: bad.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((n, n), flat).map_err(|_| GraphError::Shape {
            rows: n,
            cols: n,
        })?;
        Self::from_adjacency(kind, &matrix)
    }
}

/// Check that `matrix` is square, symmetric and has a null diagonal
///
/// Comparisons are exact: a symmetric matrix must be bitwise symmetric.
pub fn validate_adjacency(matrix: &Array2<f64>) -> GraphResult<()> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(GraphError::Shape { rows, cols });
    }

    for i in 0..rows {
        for j in (i + 1)..cols {
            let (forward, backward) = (matrix[[i, j]], matrix[[j, i]]);
            if forward != backward {
                return Err(GraphError::Asymmetry {
                    i,
                    j,
                    forward,
                    backward,
                });
            }
        }
    }

    for index in 0..rows {
        let value = matrix[[index, index]];
        if value != 0.0 {
            return Err(GraphError::NonZeroDiagonal { index, value });
        }
    }
    Ok(())
}

/// Upper-triangle triplets (`i < j`) of every non-zero entry, ordered by `(i, j)`
pub fn to_sparse(dense: &Array2<f64>) -> Vec<SparseRow> {
    let mut rows = Vec::new();
    for ((i, j), &distance) in dense.indexed_iter() {
        if i < j && distance != 0.0 {
            rows.push(SparseRow::new(i as u32, j as u32, distance));
        }
    }
    rows
}

/// Triplets of every non-zero off-diagonal entry, ordered by `(i, j)`
pub fn to_sparse_full(dense: &Array2<f64>) -> Vec<SparseRow> {
    let mut rows = Vec::new();
    for ((i, j), &distance) in dense.indexed_iter() {
        if i != j && distance != 0.0 {
            rows.push(SparseRow::new(i as u32, j as u32, distance));
        }
    }
    rows
}

/// Relabel raw indices to `0..N-1`, preserving their relative order
///
/// Returns the relabelled triplets and, for every new index, the original id.
pub fn remap_contiguous(triplets: &[SparseRow]) -> (Vec<SparseRow>, Vec<NodeId>) {
    let mut mapping: BTreeMap<u32, u32> = BTreeMap::new();
    for row in triplets {
        mapping.insert(row.i, 0);
        mapping.insert(row.j, 0);
    }
    let mut originals = Vec::with_capacity(mapping.len());
    for (new_index, (raw, slot)) in mapping.iter_mut().enumerate() {
        *slot = new_index as u32;
        originals.push(NodeId(*raw));
    }

    let remapped = triplets
        .iter()
        .map(|row| SparseRow::new(mapping[&row.i], mapping[&row.j], row.distance))
        .collect();
    (remapped, originals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_from_sparse_builds_matrices() {
        let triplets = [
            SparseRow::new(0, 1, 0.8),
            SparseRow::new(1, 2, 0.8),
            SparseRow::new(2, 0, 0.5),
        ];
        let net = Network::from_sparse(LinkKind::Undirected, &triplets).unwrap();

        assert_eq!(net.size(), 3);
        assert_eq!(net.link_count(), 3);
        assert_eq!(net.target_matrix()[[0, 2]], 0.5);
        assert_eq!(net.target_matrix()[[2, 0]], 0.5);
        assert!(net.link_matrix()[[1, 2]] && net.link_matrix()[[2, 1]]);
        assert!(!net.link_matrix()[[0, 0]]);
    }

    #[test]
    fn test_from_sparse_rejects_bad_distances() {
        for distance in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let result = Network::from_sparse(
                LinkKind::Undirected,
                &[SparseRow::new(0, 1, 1.0), SparseRow::new(1, 2, distance)],
            );
            assert!(
                matches!(result, Err(GraphError::InvalidDistance { i: 1, j: 2, .. })),
                "distance {} should be rejected",
                distance
            );
        }
    }

    #[test]
    fn test_duplicate_rows_last_write_wins() {
        let triplets = [SparseRow::new(3, 4, 1.0), SparseRow::new(4, 3, 1.5)];
        let net = Network::from_sparse(LinkKind::Undirected, &triplets).unwrap();
        assert_eq!(net.link_count(), 1);
        assert_eq!(net.target_matrix()[[3, 4]], 1.5);
    }

    #[test]
    fn test_from_sparse_accepts_gaps_but_iteration_fails() {
        let net = Network::from_sparse(LinkKind::Undirected, &[SparseRow::new(0, 5, 1.0)])
            .unwrap();
        assert_eq!(net.size(), 6);
        assert_eq!(net.node_count(), 2);
        assert_eq!(
            net.ordered_nodes().unwrap_err(),
            GraphError::IndexGap(NodeId(1))
        );
    }

    #[test]
    fn test_validate_adjacency_errors() {
        let non_square = Array2::<f64>::zeros((2, 3));
        assert_eq!(
            validate_adjacency(&non_square),
            Err(GraphError::Shape { rows: 2, cols: 3 })
        );

        let asymmetric = arr2(&[[0.0, 1.0], [2.0, 0.0]]);
        assert!(matches!(
            validate_adjacency(&asymmetric),
            Err(GraphError::Asymmetry { i: 0, j: 1, .. })
        ));

        let diagonal = arr2(&[[1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]]);
        assert_eq!(
            validate_adjacency(&diagonal),
            Err(GraphError::NonZeroDiagonal {
                index: 0,
                value: 1.0
            })
        );
    }

    #[test]
    fn test_from_adjacency_rows_rejects_ragged_input() {
        let rows = vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0]];
        assert!(matches!(
            Network::from_adjacency_rows(LinkKind::Undirected, &rows),
            Err(GraphError::Shape { .. })
        ));
    }

    #[test]
    fn test_from_adjacency_directed_gets_both_orientations() {
        let matrix = arr2(&[[0.0, 2.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);

        let undirected = Network::from_adjacency(LinkKind::Undirected, &matrix).unwrap();
        assert_eq!(undirected.link_count(), 1);
        assert_eq!(undirected.node_count(), 3);

        let directed = Network::from_adjacency(LinkKind::Directed, &matrix).unwrap();
        assert_eq!(directed.link_count(), 2);
        assert_eq!(directed.target_matrix(), &matrix);
    }

    #[test]
    fn test_to_sparse_ordering() {
        let matrix = arr2(&[[0.0, 0.3, 0.2], [0.3, 0.0, 0.0], [0.2, 0.0, 0.0]]);
        assert_eq!(
            to_sparse(&matrix),
            vec![SparseRow::new(0, 1, 0.3), SparseRow::new(0, 2, 0.2)]
        );
        assert_eq!(to_sparse_full(&matrix).len(), 4);
    }

    #[test]
    fn test_remap_contiguous() {
        let triplets = [SparseRow::new(10, 3, 1.0), SparseRow::new(3, 7, 2.0)];
        let (remapped, originals) = remap_contiguous(&triplets);

        assert_eq!(originals, vec![NodeId(3), NodeId(7), NodeId(10)]);
        assert_eq!(
            remapped,
            vec![SparseRow::new(2, 0, 1.0), SparseRow::new(0, 1, 2.0)]
        );
        let net = Network::from_sparse(LinkKind::Undirected, &remapped).unwrap();
        assert!(net.check_contiguous().is_ok());
    }
}
