//! Serializable view of an assembled graph.

use crate::depict::DepictionWarning;
use crate::graph::{GraphEdge, Presentation, ScaffoldGraph};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub has_image: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    pub id: String,
    pub presentation: Presentation,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<GraphEdge>,
    pub warnings: Vec<DepictionWarning>,
}

impl<T: ?Sized> ScaffoldGraph<'_, T> {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            id: self.id().to_string(),
            presentation: self.presentation().clone(),
            nodes: self
                .nodes()
                .map(|n| NodeSnapshot {
                    id: n.id.clone(),
                    level: n.level,
                    label: n.label.clone(),
                    has_image: n.has_image(),
                })
                .collect(),
            edges: self.edges().cloned().collect(),
            warnings: self.warnings().to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
