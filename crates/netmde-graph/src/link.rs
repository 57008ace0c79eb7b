// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Links between nodes
//!
//! Two variants share one struct and differ only in their equivalence:
//! - **Undirected**: `L(a,b) == L(b,a)`. Endpoints are stored in ascending
//!   order at construction, so equality and hashing reduce to ordinary
//!   ordered-pair comparison and a set never holds both orderings.
//! - **Directed**: `L(a,b) != L(b,a)`. `node1` is the parent, `node2` the child.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::ids::NodeId;

/// Equivalence flavour of the links of a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Undirected,
    Directed,
}

/// Canonical endpoint pair used for deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    pub node1: NodeId,
    pub node2: NodeId,
}

impl LinkKey {
    pub fn new(kind: LinkKind, a: NodeId, b: NodeId) -> Self {
        match kind {
            LinkKind::Undirected if b < a => Self { node1: b, node2: a },
            _ => Self { node1: a, node2: b },
        }
    }
}

/// Target distances must be finite and strictly positive
pub(crate) fn check_distance(a: NodeId, b: NodeId, distance: f64) -> GraphResult<()> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidDistance {
            i: a.0,
            j: b.0,
            distance,
        })
    }
}

/// A weighted link between two nodes
#[derive(Debug, Clone)]
pub struct Link {
    kind: LinkKind,
    node1: NodeId,
    node2: NodeId,
    length: f64,
    activation: f64,
}

impl Link {
    /// Undirected link; endpoint order is irrelevant
    ///
    /// # Errors
    /// `InvalidEndpoint` for self-loops, `InvalidDistance` for non-finite or
    /// non-positive lengths.
    pub fn undirected(a: NodeId, b: NodeId, length: f64) -> GraphResult<Self> {
        Self::new(LinkKind::Undirected, a, b, length)
    }

    /// Directed link from `parent` to `child`
    pub fn directed(parent: NodeId, child: NodeId, length: f64) -> GraphResult<Self> {
        Self::new(LinkKind::Directed, parent, child, length)
    }

    pub fn new(kind: LinkKind, a: NodeId, b: NodeId, length: f64) -> GraphResult<Self> {
        if a == b {
            return Err(GraphError::InvalidEndpoint(format!(
                "autolink not allowed: {} -> {}",
                a, b
            )));
        }
        check_distance(a, b, length)?;
        let key = LinkKey::new(kind, a, b);
        Ok(Self {
            kind,
            node1: key.node1,
            node2: key.node2,
            length,
            activation: 0.0,
        })
    }

    #[inline]
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    #[inline]
    pub fn node1(&self) -> NodeId {
        self.node1
    }

    #[inline]
    pub fn node2(&self) -> NodeId {
        self.node2
    }

    #[inline]
    pub fn key(&self) -> LinkKey {
        LinkKey {
            node1: self.node1,
            node2: self.node2,
        }
    }

    /// Target distance of this link
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub(crate) fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    /// Normalized stress in `[-1, 1]`, 0 until computed
    #[inline]
    pub fn activation(&self) -> f64 {
        self.activation
    }

    pub fn set_activation(&mut self, activation: f64) {
        self.activation = activation;
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.node1 == node || self.node2 == node
    }

    /// Given one endpoint, return the other one
    ///
    /// Directed links only answer for their parent (`node1`).
    ///
    /// # Errors
    /// `InvalidEndpoint` if `node` is not a valid endpoint for this request.
    pub fn child(&self, node: NodeId) -> GraphResult<NodeId> {
        match self.kind {
            LinkKind::Undirected if node == self.node1 => Ok(self.node2),
            LinkKind::Undirected if node == self.node2 => Ok(self.node1),
            LinkKind::Directed if node == self.node1 => Ok(self.node2),
            _ => Err(GraphError::InvalidEndpoint(format!(
                "{} is not a parent endpoint of {}",
                node, self
            ))),
        }
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key() == other.key()
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.key().hash(state);
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LinkKind::Undirected => write!(
                f,
                "uL({}<->{}:{:1.2})",
                self.node1.0, self.node2.0, self.length
            ),
            LinkKind::Directed => write!(
                f,
                "dL({}->{}:{:1.2})",
                self.node1.0, self.node2.0, self.length
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of(link: &Link) -> u64 {
        let mut hasher = DefaultHasher::new();
        link.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_undirected_equivalence() {
        let ab = Link::undirected(NodeId(1), NodeId(2), 0.1).unwrap();
        let ba = Link::undirected(NodeId(2), NodeId(1), 0.1).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(hash_of(&ab), hash_of(&ba));
        assert_eq!(ba.node1(), NodeId(1));
    }

    #[test]
    fn test_undirected_set_dedup() {
        // 1-2 twice, 3-4 twice with different lengths: three distinct links
        let sparse = [(1, 2, 0.1), (2, 1, 0.1), (1, 3, 0.5), (3, 4, 1.0), (4, 3, 1.5)];
        let links: HashSet<Link> = sparse
            .iter()
            .map(|&(i, j, d)| Link::undirected(NodeId(i), NodeId(j), d).unwrap())
            .collect();
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn test_directed_links_are_ordered() {
        let sparse = [(1, 2, 0.1), (2, 1, 0.1), (1, 3, 0.5), (3, 4, 1.0), (4, 3, 1.5)];
        let links: HashSet<Link> = sparse
            .iter()
            .map(|&(i, j, d)| Link::directed(NodeId(i), NodeId(j), d).unwrap())
            .collect();
        assert_eq!(links.len(), 5);
    }

    #[test]
    fn test_child() {
        let link = Link::undirected(NodeId(4), NodeId(2), 1.0).unwrap();
        assert_eq!(link.child(NodeId(4)), Ok(NodeId(2)));
        assert_eq!(link.child(NodeId(2)), Ok(NodeId(4)));
        assert!(matches!(
            link.child(NodeId(9)),
            Err(GraphError::InvalidEndpoint(_))
        ));

        let directed = Link::directed(NodeId(4), NodeId(2), 1.0).unwrap();
        assert_eq!(directed.child(NodeId(4)), Ok(NodeId(2)));
        assert!(matches!(
            directed.child(NodeId(2)),
            Err(GraphError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_rejects_self_loop_and_bad_length() {
        assert!(matches!(
            Link::undirected(NodeId(1), NodeId(1), 1.0),
            Err(GraphError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            Link::undirected(NodeId(1), NodeId(2), -1.0),
            Err(GraphError::InvalidDistance { .. })
        ));
        assert!(matches!(
            Link::directed(NodeId(1), NodeId(2), f64::NAN),
            Err(GraphError::InvalidDistance { .. })
        ));
    }

    #[test]
    fn test_display() {
        let link = Link::undirected(NodeId(2), NodeId(1), 0.5).unwrap();
        assert_eq!(link.to_string(), "uL(1<->2:0.50)");
        let link = Link::directed(NodeId(2), NodeId(1), 0.5).unwrap();
        assert_eq!(link.to_string(), "dL(2->1:0.50)");
    }
}
