//! Capability interfaces for the external scaffold collection.
//!
//! A scaffold tree and a scaffold network differ in how their nodes relate, but the projection
//! only needs two things per matrix index: the node's level and a handle to its structure.

use serde::{Deserialize, Serialize};

/// A single scaffold node as seen by the projection.
pub trait ScaffoldNode {
    /// Opaque structure handle handed to the depiction collaborator.
    type Structure: ?Sized;

    /// Depth (tree) or rank (network) of the node inside its collection.
    fn level(&self) -> u32;

    fn structure(&self) -> &Self::Structure;
}

/// A scaffold tree or network exposing an adjacency-matrix view.
pub trait ScaffoldCollection {
    type Node: ScaffoldNode;

    /// Row-major 0/1 adjacency matrix. Row `i` describes the node returned by
    /// [`ScaffoldCollection::matrix_node`] for index `i`.
    fn adjacency_matrix(&self) -> Vec<Vec<u8>>;

    fn node_count(&self) -> usize;

    fn matrix_node(&self, index: usize) -> Option<&Self::Node>;
}

/// Plain node record: a level plus a structure handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixNode<S> {
    pub level: u32,
    pub structure: S,
}

impl<S> ScaffoldNode for MatrixNode<S> {
    type Structure = S;

    fn level(&self) -> u32 {
        self.level
    }

    fn structure(&self) -> &S {
        &self.structure
    }
}

/// A collection snapshot that already carries its matrix, e.g. one exported to JSON by the
/// scaffold generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCollection<S> {
    pub matrix: Vec<Vec<u8>>,
    pub nodes: Vec<MatrixNode<S>>,
}

impl<S> MatrixCollection<S> {
    pub fn new(matrix: Vec<Vec<u8>>, nodes: Vec<MatrixNode<S>>) -> Self {
        Self { matrix, nodes }
    }
}

impl<S> ScaffoldCollection for MatrixCollection<S> {
    type Node = MatrixNode<S>;

    fn adjacency_matrix(&self) -> Vec<Vec<u8>> {
        self.matrix.clone()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn matrix_node(&self, index: usize) -> Option<&MatrixNode<S>> {
        self.nodes.get(index)
    }
}
