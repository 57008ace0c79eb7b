// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network node: identity, embedding position, scalar payload and incident links

use core::fmt;

use crate::error::{GraphError, GraphResult};
use crate::ids::{LinkId, NodeId};

/// A node of a [`Network`](crate::Network)
///
/// Nodes hold their incident links by [`LinkId`]; links refer back to their
/// endpoints by [`NodeId`]. Neither side owns the other.
#[derive(Debug, Clone)]
pub struct Node {
    n: NodeId,
    position: Option<Vec<f64>>,
    value: Option<f64>,
    /// Undirected: every incident link. Directed: links where this node is the source.
    synapses: Vec<LinkId>,
    /// Directed only: links where this node is the target
    afferents: Vec<LinkId>,
}

impl Node {
    pub fn new(n: NodeId) -> Self {
        Self {
            n,
            position: None,
            value: None,
            synapses: Vec::new(),
            afferents: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.n
    }

    /// Position in the embedding
    ///
    /// # Errors
    /// `UninitializedPosition` if the embedding has not been initialized yet.
    pub fn position(&self) -> GraphResult<&[f64]> {
        self.position
            .as_deref()
            .ok_or(GraphError::UninitializedPosition(self.n))
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub(crate) fn set_position(&mut self, position: Vec<f64>) {
        self.position = Some(position);
    }

    /// Scalar payload carried by the node
    ///
    /// # Errors
    /// `UninitializedValue` if no value was ever set.
    pub fn value(&self) -> GraphResult<f64> {
        self.value.ok_or(GraphError::UninitializedValue(self.n))
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    /// Links registered on this node (see field docs for directed semantics)
    pub fn synapses(&self) -> &[LinkId] {
        &self.synapses
    }

    /// Incoming links of a directed network (always empty for undirected ones)
    pub fn afferents(&self) -> &[LinkId] {
        &self.afferents
    }

    /// Number of registered synapses
    pub fn order(&self) -> usize {
        self.synapses.len()
    }

    pub(crate) fn register_synapse(&mut self, link: LinkId) {
        self.synapses.push(link);
    }

    pub(crate) fn register_afferent(&mut self, link: LinkId) {
        self.afferents.push(link);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.n)
    }
}
