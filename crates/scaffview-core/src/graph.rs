//! Graph container produced by assembly.
//!
//! Nodes and edges are string keyed and kept in insertion order. The graph is undirected and
//! simple apart from self-loops: at most one edge exists per unordered endpoint pair.

use crate::depict::{DepictionScope, DepictionWarning, NodeImage};
use rustc_hash::FxBuildHasher;
use serde::Serialize;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Presentation metadata carried alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub style_sheet: String,
    /// Prefer slower, higher quality rendering.
    pub quality: bool,
    pub antialias: bool,
}

#[derive(Debug)]
pub struct GraphNode<'c, T: ?Sized> {
    pub id: String,
    pub index: usize,
    pub level: u32,
    /// The collection node this graph node was projected from.
    pub source: &'c T,
    pub label: Option<String>,
    pub image: Option<NodeImage>,
}

impl<T: ?Sized> GraphNode<'_, T> {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Reason an edge was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdgeRejected {
    #[error("edge id already used: {0}")]
    DuplicateId(String),
    #[error("edge endpoint does not exist: {0}")]
    MissingEndpoint(String),
    #[error("nodes {0} and {1} are already connected")]
    DuplicatePair(String, String),
}

pub struct ScaffoldGraph<'c, T: ?Sized> {
    id: String,
    presentation: Presentation,

    nodes: Vec<GraphNode<'c, T>>,
    node_index: HashMap<String, usize>,

    edges: Vec<GraphEdge>,
    edge_index: HashMap<String, usize>,
    pair_index: HashMap<(String, String), usize>,

    warnings: Vec<DepictionWarning>,
    scope: Option<DepictionScope>,
}

impl<T: ?Sized> std::fmt::Debug for ScaffoldGraph<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaffoldGraph")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("warnings", &self.warnings)
            .finish()
    }
}

fn pair_key(v: &str, w: &str) -> (String, String) {
    if v <= w {
        (v.to_string(), w.to_string())
    } else {
        (w.to_string(), v.to_string())
    }
}

impl<'c, T: ?Sized> ScaffoldGraph<'c, T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            presentation: Presentation::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            pair_index: HashMap::default(),
            warnings: Vec::new(),
            scope: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn set_presentation(&mut self, presentation: Presentation) -> &mut Self {
        self.presentation = presentation;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts `node`, replacing an existing node with the same id.
    pub fn set_node(&mut self, node: GraphNode<'c, T>) -> &mut Self {
        if let Some(&idx) = self.node_index.get(&node.id) {
            self.nodes[idx] = node;
            return self;
        }
        let idx = self.nodes.len();
        self.node_index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode<'c, T>> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode<'c, T>> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<String>,
        v: &str,
        w: &str,
    ) -> Result<&GraphEdge, EdgeRejected> {
        let id = id.into();
        if self.edge_index.contains_key(&id) {
            return Err(EdgeRejected::DuplicateId(id));
        }
        for endpoint in [v, w] {
            if !self.has_node(endpoint) {
                return Err(EdgeRejected::MissingEndpoint(endpoint.to_string()));
            }
        }
        let pair = pair_key(v, w);
        if self.pair_index.contains_key(&pair) {
            return Err(EdgeRejected::DuplicatePair(pair.0, pair.1));
        }

        let idx = self.edges.len();
        self.edge_index.insert(id.clone(), idx);
        self.pair_index.insert(pair, idx);
        self.edges.push(GraphEdge {
            id,
            source: v.to_string(),
            target: w.to_string(),
        });
        Ok(&self.edges[idx])
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        self.pair_index.contains_key(&pair_key(v, w))
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    pub fn edge_between(&self, v: &str, w: &str) -> Option<&GraphEdge> {
        self.pair_index
            .get(&pair_key(v, w))
            .map(|&idx| &self.edges[idx])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    /// Edges incident to `id`; a self-loop is reported once.
    pub fn node_edges(&self, id: &str) -> Vec<&GraphEdge> {
        self.edges
            .iter()
            .filter(|e| e.source == id || e.target == id)
            .collect()
    }

    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in &self.edges {
            let other = if e.source == id {
                e.target.as_str()
            } else if e.target == id {
                e.source.as_str()
            } else {
                continue;
            };
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// Depiction failures recovered while this graph was assembled.
    pub fn warnings(&self) -> &[DepictionWarning] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: DepictionWarning) {
        self.warnings.push(warning);
    }

    pub(crate) fn attach_scope(&mut self, scope: DepictionScope) {
        self.scope = Some(scope);
    }

    /// Directory holding this graph's temporary depiction files, if any.
    pub fn depiction_dir(&self) -> Option<&std::path::Path> {
        self.scope.as_ref().map(DepictionScope::path)
    }

    /// Deletes the temporary depiction files.
    ///
    /// Images stay attached in memory; renderers fall back to the in-memory bitmaps once the
    /// files are gone. Dropping the graph releases the files as well.
    pub fn release_depictions(&mut self) -> std::io::Result<()> {
        let Some(scope) = self.scope.take() else {
            return Ok(());
        };
        for node in &mut self.nodes {
            if let Some(image) = node.image.as_mut() {
                image.file = None;
            }
        }
        scope.close()
    }
}
