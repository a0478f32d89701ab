use crate::collection::ScaffoldNode;

/// Identity and label computed for one matrix index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundNode {
    pub id: String,
    pub index: usize,
    pub level: u32,
    pub label: Option<String>,
}

pub fn node_id(index: usize) -> String {
    index.to_string()
}

pub fn node_label(level: u32, index: usize) -> String {
    format!("Level: {level}; Index: {index}")
}

pub fn bind_node<T: ScaffoldNode + ?Sized>(index: usize, node: &T, label_nodes: bool) -> BoundNode {
    let level = node.level();
    BoundNode {
        id: node_id(index),
        index,
        level,
        label: label_nodes.then(|| node_label(level, index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::MatrixNode;

    #[test]
    fn label_carries_level_and_index() {
        let node = MatrixNode {
            level: 3,
            structure: (),
        };
        let bound = bind_node(7, &node, true);
        assert_eq!(bound.id, "7");
        assert_eq!(bound.label.as_deref(), Some("Level: 3; Index: 7"));
    }

    #[test]
    fn labels_can_be_disabled() {
        let node = MatrixNode {
            level: 0,
            structure: (),
        };
        assert_eq!(bind_node(0, &node, false).label, None);
    }
}
