// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Network: topology, per-entity state and the dense descriptive matrices.

## Storage

```text
nodes       BTreeMap<NodeId, Node>    index-ordered, may contain gaps
links       Vec<Link>                 arena, addressed by LinkId
link_index  AHashMap<LinkKey, LinkId> canonical endpoint pair -> arena slot
link_mask   Array2<bool>  (N x N)     linkM
target      Array2<f64>   (N x N)     targetM
```

`N` is `max(index) + 1` over every node ever referenced, so the matrices are
always square and addressable by raw node index. For undirected networks both
`[i,j]` and `[j,i]` are written on every connect.
*/

use core::fmt;
use std::collections::BTreeMap;

use ahash::AHashMap;
use ndarray::{s, Array2};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::ids::{LinkId, NodeId};
use crate::link::{check_distance, Link, LinkKey, LinkKind};
use crate::matrix::SparseRow;
use crate::node::Node;

/// Supported embedding dimensionalities
pub const SUPPORTED_DIMENSIONS: [usize; 2] = [2, 3];

/// A weighted graph of nodes and links
#[derive(Debug, Clone)]
pub struct Network {
    kind: LinkKind,
    nodes: BTreeMap<NodeId, Node>,
    links: Vec<Link>,
    link_index: AHashMap<LinkKey, LinkId>,
    link_mask: Array2<bool>,
    target: Array2<f64>,
    repr_dim: Option<usize>,
}

impl Network {
    pub fn new(kind: LinkKind) -> Self {
        Self {
            kind,
            nodes: BTreeMap::new(),
            links: Vec::new(),
            link_index: AHashMap::new(),
            link_mask: Array2::from_elem((0, 0), false),
            target: Array2::zeros((0, 0)),
            repr_dim: None,
        }
    }

    pub fn undirected() -> Self {
        Self::new(LinkKind::Undirected)
    }

    pub fn directed() -> Self {
        Self::new(LinkKind::Directed)
    }

    #[inline]
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// `N`: side of the network matrices (`max(index) + 1`)
    #[inline]
    pub fn size(&self) -> usize {
        self.link_mask.nrows()
    }

    /// Number of registered nodes (equals [`size`](Self::size) when there are no gaps)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Registered nodes in index order, skipping gaps
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Mutable access to a link's activation
    ///
    /// Length changes go through [`set_link_length`](Self::set_link_length) so
    /// the target matrix stays in sync.
    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.get_mut(id.index())
    }

    /// Links in creation order
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter()
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> + '_ {
        self.links.iter_mut()
    }

    /// Find the link joining `a` and `b` (ordered for directed networks)
    pub fn find_link(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.link_index.get(&LinkKey::new(self.kind, a, b)).copied()
    }

    /// Register a node (no-op if it already exists), growing the matrices if needed
    pub fn add_node(&mut self, id: NodeId) -> &mut Node {
        self.ensure_size(id.index() + 1);
        self.nodes.entry(id).or_insert_with(|| Node::new(id))
    }

    /// Register nodes `0..count`
    pub fn add_nodes(&mut self, count: usize) {
        for n in 0..count {
            self.add_node(NodeId(n as u32));
        }
    }

    /// Connect `a` to `b` at target `distance`
    ///
    /// For undirected networks connecting an existing pair (in either order)
    /// returns the existing link and re-sets its distance. Missing nodes are
    /// created on the fly.
    ///
    /// # Errors
    /// `InvalidEndpoint` for self-loops, `InvalidDistance` for non-finite or
    /// non-positive distances.
    pub fn connect(&mut self, a: NodeId, b: NodeId, distance: f64) -> GraphResult<LinkId> {
        if let Some(existing) = self.find_link(a, b) {
            check_distance(a, b, distance)?;
            let previous = self.links[existing.index()].length();
            if previous != distance {
                debug!(
                    "relinking {} -> {}: target distance {} replaced by {}",
                    a, b, previous, distance
                );
                self.write_length(existing, distance);
            }
            return Ok(existing);
        }

        let link = Link::new(self.kind, a, b, distance)?;
        let id = LinkId(self.links.len() as u32);

        self.add_node(a);
        self.add_node(b);

        match self.kind {
            LinkKind::Undirected => {
                if let Some(node) = self.nodes.get_mut(&a) {
                    node.register_synapse(id);
                }
                if let Some(node) = self.nodes.get_mut(&b) {
                    node.register_synapse(id);
                }
            }
            LinkKind::Directed => {
                if let Some(node) = self.nodes.get_mut(&a) {
                    node.register_synapse(id);
                }
                if let Some(node) = self.nodes.get_mut(&b) {
                    node.register_afferent(id);
                }
            }
        }

        self.link_index.insert(link.key(), id);
        self.links.push(link);
        self.write_length(id, distance);
        Ok(id)
    }

    /// Change the target distance of an existing link
    ///
    /// # Errors
    /// `LinkNotFound` if `a` and `b` are not linked, `InvalidDistance` for a
    /// bad distance.
    pub fn set_link_length(&mut self, a: NodeId, b: NodeId, distance: f64) -> GraphResult<()> {
        let id = self
            .find_link(a, b)
            .ok_or(GraphError::LinkNotFound(a, b))?;
        check_distance(a, b, distance)?;
        self.write_length(id, distance);
        Ok(())
    }

    fn write_length(&mut self, id: LinkId, distance: f64) {
        let link = &mut self.links[id.index()];
        link.set_length(distance);
        let (i, j) = (link.node1().index(), link.node2().index());

        self.link_mask[[i, j]] = true;
        self.target[[i, j]] = distance;
        if self.kind == LinkKind::Undirected {
            self.link_mask[[j, i]] = true;
            self.target[[j, i]] = distance;
        }
    }

    /// Grow the matrices so that they are at least `size x size`
    pub(crate) fn ensure_size(&mut self, size: usize) {
        let current = self.size();
        if size <= current {
            return;
        }
        debug!("growing network matrices {} -> {}", current, size);

        let mut link_mask = Array2::from_elem((size, size), false);
        link_mask
            .slice_mut(s![..current, ..current])
            .assign(&self.link_mask);
        let mut target = Array2::zeros((size, size));
        target.slice_mut(s![..current, ..current]).assign(&self.target);

        self.link_mask = link_mask;
        self.target = target;
    }

    /// `linkM`: `[i,j]` is true iff a link (in that direction) exists
    pub fn link_matrix(&self) -> &Array2<bool> {
        &self.link_mask
    }

    /// `targetM`: target distance where linked, 0 elsewhere
    pub fn target_matrix(&self) -> &Array2<f64> {
        &self.target
    }

    /// `targetSM`: one triplet per link, ordered by `(i, j)`
    pub fn target_sparse(&self) -> Vec<SparseRow> {
        let mut rows: Vec<SparseRow> = self
            .links
            .iter()
            .map(|link| SparseRow::new(link.node1().0, link.node2().0, link.length()))
            .collect();
        rows.sort_by_key(|row| (row.i, row.j));
        rows
    }

    /// Nodes in index order `0..N-1`
    ///
    /// Yields `Err(IndexGap)` once at the first missing index and then stops.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter {
            network: self,
            next: 0,
            failed: false,
        }
    }

    /// All nodes in index order
    ///
    /// # Errors
    /// `IndexGap` if any index in `0..N` has no registered node.
    pub fn ordered_nodes(&self) -> GraphResult<Vec<&Node>> {
        self.iter().collect()
    }

    /// Check that every index in `0..N` has a node
    pub fn check_contiguous(&self) -> GraphResult<()> {
        self.iter().try_for_each(|node| node.map(|_| ()))
    }

    /// Dimensionality of the embedding, once initialized
    pub fn repr_dim(&self) -> Option<usize> {
        self.repr_dim
    }

    /// Node positions as an `N x repr_dim` matrix
    ///
    /// # Errors
    /// `IndexGap` for non-contiguous networks, `UninitializedPosition` if the
    /// embedding was never initialized.
    pub fn positions(&self) -> GraphResult<Array2<f64>> {
        let nodes = self.ordered_nodes()?;
        let dim = match (self.repr_dim, nodes.first()) {
            (Some(dim), _) => dim,
            (None, Some(node)) => return Err(GraphError::UninitializedPosition(node.id())),
            (None, None) => return Ok(Array2::zeros((0, 0))),
        };

        let mut positions = Array2::zeros((nodes.len(), dim));
        for (row, node) in nodes.iter().enumerate() {
            let position = node.position()?;
            for (k, coordinate) in position.iter().enumerate() {
                positions[[row, k]] = *coordinate;
            }
        }
        Ok(positions)
    }

    /// Overwrite every node position from an `N x repr_dim` matrix
    ///
    /// Fixes `repr_dim` to the matrix width.
    ///
    /// # Errors
    /// `DimensionMismatch` if the row count differs from `N` or the width is
    /// not 2 or 3, `IndexGap` for non-contiguous networks.
    pub fn write_positions(&mut self, positions: &Array2<f64>) -> GraphResult<()> {
        if positions.nrows() != self.size() {
            return Err(GraphError::DimensionMismatch {
                expected: self.size(),
                actual: positions.nrows(),
            });
        }
        let dim = positions.ncols();
        if !SUPPORTED_DIMENSIONS.contains(&dim) {
            return Err(GraphError::DimensionMismatch {
                expected: self.repr_dim.unwrap_or(2),
                actual: dim,
            });
        }
        if let Some(current) = self.repr_dim {
            if current != dim {
                return Err(GraphError::DimensionMismatch {
                    expected: current,
                    actual: dim,
                });
            }
        }
        self.check_contiguous()?;

        for (row, node) in self.nodes.values_mut().enumerate() {
            node.set_position(positions.row(row).to_vec());
        }
        self.repr_dim = Some(dim);
        Ok(())
    }

    /// Values of all nodes in index order
    pub fn values(&self) -> GraphResult<Vec<f64>> {
        self.iter().map(|node| node?.value()).collect()
    }

    /// Assign one value per node, in index order
    ///
    /// # Errors
    /// `ValueCountMismatch` unless exactly `N` values are given.
    pub fn set_values(&mut self, values: &[f64]) -> GraphResult<()> {
        if values.len() != self.size() {
            return Err(GraphError::ValueCountMismatch {
                expected: self.size(),
                actual: values.len(),
            });
        }
        self.check_contiguous()?;
        for (node, value) in self.nodes.values_mut().zip(values) {
            node.set_value(*value);
        }
        Ok(())
    }

    /// Fraction of possible links that exist
    ///
    /// `N(N-1)/2` possible links for undirected networks, `N(N-1)` for directed ones.
    pub fn density(&self) -> f64 {
        let n = self.size() as f64;
        if n < 2.0 {
            return 0.0;
        }
        let possible = match self.kind {
            LinkKind::Undirected => n * (n - 1.0) / 2.0,
            LinkKind::Directed => n * (n - 1.0),
        };
        self.links.len() as f64 / possible
    }
}

/// Index-ordered node iterator, see [`Network::iter`]
pub struct NodeIter<'a> {
    network: &'a Network,
    next: usize,
    failed: bool,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = GraphResult<&'a Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.network.size() {
            return None;
        }
        let id = NodeId(self.next as u32);
        self.next += 1;
        match self.network.nodes.get(&id) {
            Some(node) => Some(Ok(node)),
            None => {
                self.failed = true;
                Some(Err(GraphError::IndexGap(id)))
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network ---------")?;
        for node in self.nodes.values() {
            writeln!(f, "\t{} (ord. {})", node, node.order())?;
            for link_id in node.synapses() {
                let Some(link) = self.link(*link_id) else {
                    continue;
                };
                if let Ok(child) = link.child(node.id()) {
                    writeln!(f, "\t\t{}", child)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_connect_is_idempotent() {
        let mut net = Network::undirected();
        let first = net.connect(NodeId(0), NodeId(1), 0.5).unwrap();
        let second = net.connect(NodeId(1), NodeId(0), 0.5).unwrap();

        assert_eq!(first, second);
        assert_eq!(net.link_count(), 1);
        assert_eq!(net.node(NodeId(0)).unwrap().order(), 1);
        assert_eq!(net.node(NodeId(1)).unwrap().order(), 1);
    }

    #[test]
    fn test_reconnect_resets_distance() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 0.5).unwrap();
        net.connect(NodeId(1), NodeId(0), 0.9).unwrap();

        assert_eq!(net.target_matrix()[[0, 1]], 0.9);
        assert_eq!(net.target_matrix()[[1, 0]], 0.9);
        assert_eq!(net.link(LinkId(0)).unwrap().length(), 0.9);
    }

    #[test]
    fn test_directed_connect_keeps_both_orientations() {
        let mut net = Network::directed();
        let ab = net.connect(NodeId(0), NodeId(1), 0.5).unwrap();
        let ba = net.connect(NodeId(1), NodeId(0), 0.5).unwrap();

        assert_ne!(ab, ba);
        assert_eq!(net.link_count(), 2);
        assert!(net.link_matrix()[[0, 1]]);
        assert!(net.link_matrix()[[1, 0]]);
        assert_eq!(net.node(NodeId(0)).unwrap().afferents(), &[ba]);
    }

    #[test]
    fn test_directed_matrix_is_one_sided() {
        let mut net = Network::directed();
        net.connect(NodeId(2), NodeId(0), 1.5).unwrap();

        assert!(net.link_matrix()[[2, 0]]);
        assert!(!net.link_matrix()[[0, 2]]);
        assert_eq!(net.target_matrix()[[0, 2]], 0.0);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut net = Network::undirected();
        assert!(matches!(
            net.connect(NodeId(3), NodeId(3), 1.0),
            Err(GraphError::InvalidEndpoint(_))
        ));
        assert_eq!(net.link_count(), 0);
    }

    #[test]
    fn test_matrices_grow_with_new_nodes() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        net.connect(NodeId(1), NodeId(4), 2.0).unwrap();

        assert_eq!(net.size(), 5);
        assert_eq!(net.target_matrix()[[0, 1]], 1.0);
        assert_eq!(net.target_matrix()[[4, 1]], 2.0);
    }

    #[test]
    fn test_iteration_reports_gaps() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(2), 1.0).unwrap();

        let items: Vec<_> = net.iter().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(GraphError::IndexGap(NodeId(1)))));
        assert!(net.ordered_nodes().is_err());
    }

    #[test]
    fn test_set_link_length_updates_matrix() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        net.set_link_length(NodeId(1), NodeId(0), 3.0).unwrap();

        assert_eq!(net.target_matrix()[[0, 1]], 3.0);
        assert_eq!(net.target_sparse(), vec![SparseRow::new(0, 1, 3.0)]);
        assert_eq!(
            net.set_link_length(NodeId(0), NodeId(5), 1.0),
            Err(GraphError::LinkNotFound(NodeId(0), NodeId(5)))
        );
    }

    #[test]
    fn test_values_roundtrip() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        net.connect(NodeId(1), NodeId(2), 1.0).unwrap();

        assert!(matches!(net.values(), Err(GraphError::UninitializedValue(_))));
        assert_eq!(
            net.set_values(&[1.0, 2.0]),
            Err(GraphError::ValueCountMismatch {
                expected: 3,
                actual: 2
            })
        );
        net.set_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(net.values().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_positions_roundtrip() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        assert!(matches!(
            net.positions(),
            Err(GraphError::UninitializedPosition(_))
        ));

        let positions = ndarray::arr2(&[[0.0, 0.0], [1.0, 0.0]]);
        net.write_positions(&positions).unwrap();
        assert_eq!(net.repr_dim(), Some(2));
        assert_eq!(net.positions().unwrap(), positions);
        assert_eq!(net.node(NodeId(1)).unwrap().position().unwrap(), &[1.0, 0.0]);

        let wrong_dim = ndarray::arr2(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!(matches!(
            net.write_positions(&wrong_dim),
            Err(GraphError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_density() {
        let mut net = Network::undirected();
        net.add_nodes(4);
        assert_eq!(net.density(), 0.0);
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        net.connect(NodeId(2), NodeId(3), 1.0).unwrap();
        net.connect(NodeId(0), NodeId(3), 1.0).unwrap();
        assert_eq!(net.density(), 0.5);
    }

    #[test]
    fn test_display_lists_children() {
        let mut net = Network::undirected();
        net.connect(NodeId(0), NodeId(1), 1.0).unwrap();
        let text = net.to_string();
        assert!(text.starts_with("Network ---------"));
        assert!(text.contains("N(0) (ord. 1)"));
        assert!(text.contains("\t\tN(1)"));
    }
}
