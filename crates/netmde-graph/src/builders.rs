// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Canned network constructors
//!
//! All constructors produce contiguous networks (`0..N-1`), ready for
//! embedding. Directed variants link every pair the undirected variant links,
//! in both orientations for `random`/`complete` and along the natural
//! orientation (`i -> i+1`, centre `->` leaf) for `ring`/`star`.

use ndarray::Array2;
use rand::Rng;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::ids::NodeId;
use crate::link::{check_distance, LinkKind};
use crate::network::Network;

impl Network {
    /// Random network from a thresholded symmetric uniform matrix
    ///
    /// A uniform `n x n` matrix `M` is symmetrised as `(M + Mᵀ)/2`; pairs with
    /// `M[i,j] < connection_probability` are linked at `M[i,j] * max_dist`.
    /// The symmetrised elements follow a triangular distribution, so
    /// `connection_probability` does not map linearly onto density, but it
    /// sweeps it smoothly from 0 to 1 (`p = 1` gives a complete graph, `p = 0`
    /// an empty one). Every node gets a value uniform in `[0, 1)`.
    ///
    /// # Errors
    /// `InvalidTopology` for `n == 0` or `p` outside `[0, 1]`,
    /// `InvalidDistance` for a non-positive `max_dist`.
    pub fn random<R: Rng + ?Sized>(
        kind: LinkKind,
        n: usize,
        connection_probability: f64,
        max_dist: f64,
        rng: &mut R,
    ) -> GraphResult<Self> {
        if n == 0 {
            return Err(GraphError::InvalidTopology(
                "random network needs at least one node".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&connection_probability) {
            return Err(GraphError::InvalidTopology(format!(
                "connection probability {} outside [0, 1]",
                connection_probability
            )));
        }
        check_distance(NodeId(0), NodeId(0), max_dist)?;
        debug!(
            "generating random network: n = {}, p = {}, max_dist = {}",
            n, connection_probability, max_dist
        );

        // Strictly positive draws so that every linked entry is a valid distance
        let uniform = Array2::from_shape_fn((n, n), |_| rng.gen_range(f64::EPSILON..1.0));
        let symmetric = (&uniform + &uniform.t()) * 0.5;
        let adjacency = Array2::from_shape_fn((n, n), |(i, j)| {
            let m = symmetric[[i, j]];
            if i != j && m < connection_probability {
                m * max_dist
            } else {
                0.0
            }
        });

        let mut net = Network::from_adjacency(kind, &adjacency)?;
        let values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
        net.set_values(&values)?;
        Ok(net)
    }

    /// Cycle `0 - 1 - ... - (n-1) - 0` with every link at `distance`
    ///
    /// # Errors
    /// `InvalidTopology` for `n < 3`.
    pub fn ring(kind: LinkKind, n: usize, distance: f64) -> GraphResult<Self> {
        if n < 3 {
            return Err(GraphError::InvalidTopology(format!(
                "a ring needs at least 3 nodes, got {}",
                n
            )));
        }
        let mut net = Network::new(kind);
        for i in 0..n {
            net.connect(node(i), node((i + 1) % n), distance)?;
        }
        Ok(net)
    }

    /// Node 0 linked to each of `leaves` outer nodes at `distance`
    ///
    /// # Errors
    /// `InvalidTopology` for `leaves == 0`.
    pub fn star(kind: LinkKind, leaves: usize, distance: f64) -> GraphResult<Self> {
        if leaves == 0 {
            return Err(GraphError::InvalidTopology(
                "a star needs at least one leaf".to_string(),
            ));
        }
        let mut net = Network::new(kind);
        for leaf in 1..=leaves {
            net.connect(node(0), node(leaf), distance)?;
        }
        Ok(net)
    }

    /// Every pair linked at `distance`
    ///
    /// # Errors
    /// `InvalidTopology` for `n < 2`.
    pub fn complete(kind: LinkKind, n: usize, distance: f64) -> GraphResult<Self> {
        if n < 2 {
            return Err(GraphError::InvalidTopology(format!(
                "a complete graph needs at least 2 nodes, got {}",
                n
            )));
        }
        let mut net = Network::new(kind);
        for i in 0..n {
            for j in 0..n {
                let wanted = match kind {
                    LinkKind::Undirected => i < j,
                    LinkKind::Directed => i != j,
                };
                if wanted {
                    net.connect(node(i), node(j), distance)?;
                }
            }
        }
        Ok(net)
    }
}

#[inline]
fn node(index: usize) -> NodeId {
    NodeId(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_density_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let full = Network::random(LinkKind::Undirected, 12, 1.0, 1.0, &mut rng).unwrap();
        assert_eq!(full.density(), 1.0);
        assert_eq!(full.values().unwrap().len(), 12);

        let empty = Network::random(LinkKind::Undirected, 12, 0.0, 1.0, &mut rng).unwrap();
        assert_eq!(empty.density(), 0.0);
        assert_eq!(empty.node_count(), 12);
    }

    #[test]
    fn test_random_distances_bounded_by_max_dist() {
        let mut rng = StdRng::seed_from_u64(11);
        let net = Network::random(LinkKind::Undirected, 20, 0.5, 3.0, &mut rng).unwrap();
        for link in net.links() {
            assert!(link.length() > 0.0 && link.length() < 0.5 * 3.0);
        }
        for value in net.values().unwrap() {
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_random_rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Network::random(LinkKind::Undirected, 0, 0.5, 1.0, &mut rng),
            Err(GraphError::InvalidTopology(_))
        ));
        assert!(matches!(
            Network::random(LinkKind::Undirected, 5, 1.5, 1.0, &mut rng),
            Err(GraphError::InvalidTopology(_))
        ));
        assert!(matches!(
            Network::random(LinkKind::Undirected, 5, 0.5, 0.0, &mut rng),
            Err(GraphError::InvalidDistance { .. })
        ));
    }

    #[test]
    fn test_canned_topologies() {
        let ring = Network::ring(LinkKind::Undirected, 5, 1.0).unwrap();
        assert_eq!(ring.link_count(), 5);
        assert!(ring.ordered_nodes().unwrap().iter().all(|n| n.order() == 2));

        let star = Network::star(LinkKind::Undirected, 4, 0.5).unwrap();
        assert_eq!(star.size(), 5);
        assert_eq!(star.node(NodeId(0)).unwrap().order(), 4);

        let complete = Network::complete(LinkKind::Directed, 4, 1.0).unwrap();
        assert_eq!(complete.link_count(), 12);
        assert_eq!(complete.density(), 1.0);

        assert!(Network::ring(LinkKind::Undirected, 2, 1.0).is_err());
        assert!(Network::star(LinkKind::Directed, 0, 1.0).is_err());
        assert!(Network::complete(LinkKind::Undirected, 1, 1.0).is_err());
    }
}
