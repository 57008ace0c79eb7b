// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for graph model and matrix bridge operations

use crate::ids::NodeId;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while building or reading a network
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Matrix is not square: {rows}x{cols}")]
    Shape { rows: usize, cols: usize },

    #[error("Matrix is not symmetric: M[{i},{j}] = {forward} but M[{j},{i}] = {backward}")]
    Asymmetry {
        i: usize,
        j: usize,
        forward: f64,
        backward: f64,
    },

    #[error("Matrix has non-null diagonal: M[{index},{index}] = {value}")]
    NonZeroDiagonal { index: usize, value: f64 },

    #[error("Invalid distance {distance} for link ({i}, {j}): must be finite and positive")]
    InvalidDistance { i: u32, j: u32, distance: f64 },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Node {0} position not defined yet")]
    UninitializedPosition(NodeId),

    #[error("Node {0} value not defined yet")]
    UninitializedValue(NodeId),

    #[error("Node index {0} has no registered node (indices must be contiguous)")]
    IndexGap(NodeId),

    #[error("One value must be given for each node: expected {expected}, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("Invalid neighbour count k = {k} for {points} points")]
    InvalidNeighbourCount { k: usize, points: usize },

    #[error("No link between {0} and {1}")]
    LinkNotFound(NodeId, NodeId),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
}
