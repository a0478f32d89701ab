#![forbid(unsafe_code)]

//! Projects scaffold trees and networks into renderable graphs.
//!
//! A scaffold collection exposes a dense 0/1 adjacency matrix plus one node record per matrix
//! index. [`assemble`] turns that into a [`ScaffoldGraph`]:
//! - node ids are the stringified matrix indices (`"0".."N-1"`)
//! - edges come from the lower triangle of the matrix (diagonal included) and are numbered in
//!   discovery order
//! - nodes optionally carry a `Level: <level>; Index: <index>` label
//! - node images are produced by a caller supplied [`Depicter`]; failures degrade to empty
//!   placeholder nodes instead of aborting the assembly

pub mod assemble;
pub mod bind;
pub mod collection;
pub mod config;
pub mod depict;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod snapshot;

pub use assemble::{assemble, assemble_into, assemble_with_defaults};
pub use collection::{MatrixCollection, MatrixNode, ScaffoldCollection, ScaffoldNode};
pub use config::{DepictionSize, DisplayBackend, RenderConfig, Resolution, Settings};
pub use depict::{
    Bitmap, Depicter, DepictionError, DepictionResult, DepictionWarning, NoDepiction, NodeImage,
};
pub use error::{Error, Result};
pub use graph::{EdgeRejected, GraphEdge, GraphNode, Presentation, ScaffoldGraph};
pub use matrix::{AdjacencyMatrix, DiscoveredEdge};
pub use snapshot::{GraphSnapshot, NodeSnapshot};
