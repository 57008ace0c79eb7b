// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Brute-force k-nearest-neighbour graph construction from a point cloud

use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::matrix::SparseRow;

/// `k` nearest neighbours of every point, as `(point, neighbour, distance)` triplets
///
/// Points at distance 0 (duplicates) are never neighbours, so a point with
/// fewer than `k` distinct others yields fewer rows. Ties are broken by the
/// lower neighbour index. Rows are grouped by point, nearest first.
///
/// Quadratic in the number of points.
///
/// # Errors
/// `InvalidNeighbourCount` for `k == 0` or `k >= points.len()`,
/// `DimensionMismatch` if the points do not all share one dimensionality.
pub fn knn_triplets(points: &[Vec<f64>], k: usize) -> GraphResult<Vec<SparseRow>> {
    if k == 0 || k >= points.len() {
        return Err(GraphError::InvalidNeighbourCount {
            k,
            points: points.len(),
        });
    }
    let dim = points[0].len();
    if let Some(bad) = points.iter().find(|p| p.len() != dim) {
        return Err(GraphError::DimensionMismatch {
            expected: dim,
            actual: bad.len(),
        });
    }
    info!(
        "requested knn with k = {} of {} objects in R{}",
        k,
        points.len(),
        dim
    );

    let mut rows = Vec::with_capacity(points.len() * k);
    let mut candidates: Vec<(f64, usize)> = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        candidates.clear();
        candidates.extend(
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, other)| (euclidean(point, other), j))
                .filter(|(distance, _)| *distance > 0.0),
        );
        if candidates.len() < k {
            debug!(
                "point {} has only {} distinct neighbours (k = {})",
                i,
                candidates.len(),
                k
            );
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        rows.extend(
            candidates
                .iter()
                .take(k)
                .map(|&(distance, j)| SparseRow::new(i as u32, j as u32, distance)),
        );
    }
    Ok(rows)
}

#[inline]
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
