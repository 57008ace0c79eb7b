// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed attribute views
//!
//! Reading one attribute across a homogeneous collection of nodes or links,
//! e.g. every link activation at once for a renderer.

use crate::error::GraphResult;
use crate::link::Link;
use crate::network::Network;
use crate::node::Node;

/// One attribute of every element `E` of a collection, in collection order
pub trait AttributeView<E> {
    /// Project every element through an infallible accessor
    fn attribute<T, F>(&self, accessor: F) -> Vec<T>
    where
        F: Fn(&E) -> T;

    /// Project every element through a fallible accessor, stopping at the first error
    fn try_attribute<T, F>(&self, accessor: F) -> GraphResult<Vec<T>>
    where
        F: Fn(&E) -> GraphResult<T>;
}

impl<E> AttributeView<E> for [E] {
    fn attribute<T, F>(&self, accessor: F) -> Vec<T>
    where
        F: Fn(&E) -> T,
    {
        self.iter().map(accessor).collect()
    }

    fn try_attribute<T, F>(&self, accessor: F) -> GraphResult<Vec<T>>
    where
        F: Fn(&E) -> GraphResult<T>,
    {
        self.iter().map(accessor).collect()
    }
}

/// Nodes in index order (gaps are skipped, see [`Network::iter`] for strict order)
impl AttributeView<Node> for Network {
    fn attribute<T, F>(&self, accessor: F) -> Vec<T>
    where
        F: Fn(&Node) -> T,
    {
        self.nodes().map(accessor).collect()
    }

    fn try_attribute<T, F>(&self, accessor: F) -> GraphResult<Vec<T>>
    where
        F: Fn(&Node) -> GraphResult<T>,
    {
        self.nodes().map(accessor).collect()
    }
}

/// Links in creation order
impl AttributeView<Link> for Network {
    fn attribute<T, F>(&self, accessor: F) -> Vec<T>
    where
        F: Fn(&Link) -> T,
    {
        self.links().map(accessor).collect()
    }

    fn try_attribute<T, F>(&self, accessor: F) -> GraphResult<Vec<T>>
    where
        F: Fn(&Link) -> GraphResult<T>,
    {
        self.links().map(accessor).collect()
    }
}

impl Network {
    /// Position of every node, in index order
    pub fn node_positions(&self) -> GraphResult<Vec<Vec<f64>>> {
        AttributeView::<Node>::try_attribute(self, |node| node.position().map(<[f64]>::to_vec))
    }

    /// Activation of every link, in creation order
    pub fn activations(&self) -> Vec<f64> {
        AttributeView::<Link>::attribute(self, Link::activation)
    }

    /// Target length of every link, in creation order
    pub fn lengths(&self) -> Vec<f64> {
        AttributeView::<Link>::attribute(self, Link::length)
    }
}
