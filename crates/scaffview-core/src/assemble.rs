//! Matrix-to-graph projection.

use crate::bind::{bind_node, node_id};
use crate::collection::{ScaffoldCollection, ScaffoldNode};
use crate::config::{RenderConfig, Settings};
use crate::depict::{Depicter, DepictionScope, depict_node, store_depiction};
use crate::error::{Error, Result};
use crate::graph::{GraphNode, Presentation, ScaffoldGraph};
use crate::matrix::AdjacencyMatrix;

type Structure<C> = <<C as ScaffoldCollection>::Node as ScaffoldNode>::Structure;

/// Projects `collection` into a new graph.
pub fn assemble<'c, C, D>(
    collection: &'c C,
    depicter: &D,
    config: &RenderConfig,
    settings: &Settings,
) -> Result<ScaffoldGraph<'c, C::Node>>
where
    C: ScaffoldCollection,
    D: Depicter<Structure<C>> + ?Sized,
{
    let mut graph = ScaffoldGraph::new(config.graph_id.clone());
    assemble_into(collection, depicter, config, settings, &mut graph)?;
    Ok(graph)
}

/// [`assemble`] with [`RenderConfig::default`] and the process-wide [`Settings::global`].
pub fn assemble_with_defaults<'c, C, D>(
    collection: &'c C,
    depicter: &D,
) -> Result<ScaffoldGraph<'c, C::Node>>
where
    C: ScaffoldCollection,
    D: Depicter<Structure<C>> + ?Sized,
{
    assemble(collection, depicter, &RenderConfig::default(), Settings::global())
}

/// Projects `collection` into `target`, which must be empty.
///
/// All structural checks run before `target` is touched; on error it is left unchanged.
/// Depiction failures are recovered per node and recorded in [`ScaffoldGraph::warnings`].
pub fn assemble_into<'c, C, D>(
    collection: &'c C,
    depicter: &D,
    config: &RenderConfig,
    settings: &Settings,
    target: &mut ScaffoldGraph<'c, C::Node>,
) -> Result<()>
where
    C: ScaffoldCollection,
    D: Depicter<Structure<C>> + ?Sized,
{
    config.validate()?;
    if !target.is_empty() {
        return Err(Error::NonEmptyTarget {
            nodes: target.node_count(),
            edges: target.edge_count(),
        });
    }

    let matrix = AdjacencyMatrix::from_rows(collection.adjacency_matrix())?;
    if matrix.order() != collection.node_count() {
        return Err(Error::invalid_matrix(format!(
            "matrix order {} does not match node count {}",
            matrix.order(),
            collection.node_count()
        )));
    }
    let sources = (0..matrix.order())
        .map(|i| {
            collection.matrix_node(i).ok_or_else(|| {
                Error::invalid_argument(format!("no collection node at index {i}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Created on the first successful depiction.
    let temp_dir = settings.temp_dir();
    let mut scope: Option<DepictionScope> = None;
    let mut scope_unavailable = false;

    let mut graph = ScaffoldGraph::new(config.graph_id.clone());
    graph.set_presentation(Presentation {
        style_sheet: config.style_sheet.clone(),
        quality: true,
        antialias: true,
    });

    let mut edge_count = 0usize;
    for (row, source) in sources.into_iter().enumerate() {
        let bound = bind_node(row, source, config.label_nodes);
        let image = match depict_node(row, source.structure(), depicter, config.depiction_size)
        {
            Ok(bitmap) => {
                if scope.is_none() && !scope_unavailable {
                    match DepictionScope::create_in(&temp_dir) {
                        Ok(created) => scope = Some(created),
                        Err(err) => {
                            tracing::warn!(
                                error = %err,
                                "depictions will not be written to disk"
                            );
                            scope_unavailable = true;
                        }
                    }
                }
                Some(store_depiction(row, bitmap, scope.as_ref()))
            }
            Err(warning) => {
                graph.push_warning(warning);
                None
            }
        };
        graph.set_node(GraphNode {
            id: bound.id,
            index: row,
            level: bound.level,
            source,
            label: bound.label,
            image,
        });

        for edge in matrix.row_edges(row, edge_count) {
            graph
                .add_edge(edge.id.to_string(), &node_id(edge.row), &node_id(edge.column))
                .map_err(|err| Error::invalid_matrix(err.to_string()))?;
            edge_count += 1;
        }
    }

    if let Some(scope) = scope {
        graph.attach_scope(scope);
    }
    tracing::debug!(
        graph = graph.id(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        placeholders = graph.warnings().len(),
        "assembled scaffold graph"
    );

    *target = graph;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{MatrixCollection, MatrixNode};
    use crate::config::DepictionSize;
    use crate::depict::{Bitmap, DepictionError, DepictionResult, NoDepiction};

    fn collection(matrix: Vec<Vec<u8>>) -> MatrixCollection<String> {
        let nodes = (0..matrix.len())
            .map(|i| MatrixNode {
                level: i as u32,
                structure: format!("S{i}"),
            })
            .collect();
        MatrixCollection::new(matrix, nodes)
    }

    fn settings(tmp: &tempfile::TempDir) -> Settings {
        Settings::default().with_working_dir(tmp.path())
    }

    #[test]
    fn three_node_example() {
        let tmp = tempfile::tempdir().unwrap();
        let c = collection(vec![vec![0, 0, 0], vec![1, 0, 0], vec![1, 1, 0]]);
        let g = assemble(&c, &NoDepiction, &RenderConfig::default(), &settings(&tmp)).unwrap();

        assert_eq!(g.node_ids(), vec!["0", "1", "2"]);
        assert_eq!(g.edge_count(), 3);
        assert!(g.has_edge("0", "1"));
        assert!(g.has_edge("0", "2"));
        assert!(g.has_edge("1", "2"));
        assert_eq!(
            g.node("0").unwrap().label.as_deref(),
            Some("Level: 0; Index: 0")
        );
        let ids: Vec<&str> = g.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn rejects_node_count_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = collection(vec![vec![0, 0], vec![1, 0]]);
        c.nodes.pop();
        let err =
            assemble(&c, &NoDepiction, &RenderConfig::default(), &settings(&tmp)).unwrap_err();
        assert!(matches!(err, Error::InvalidMatrix { .. }));
    }

    #[test]
    fn depicted_nodes_carry_images() {
        let tmp = tempfile::tempdir().unwrap();
        let c = collection(vec![vec![0, 0], vec![1, 0]]);
        let depicter = |s: &String, size: DepictionSize| -> DepictionResult {
            if s == "S1" {
                return Err(DepictionError::structure("kekulization failed"));
            }
            Ok(Bitmap::new(size.width, size.height))
        };
        let config = RenderConfig::default().with_depiction_size(DepictionSize::new(4, 4));
        let g = assemble(&c, &depicter, &config, &settings(&tmp)).unwrap();

        let n0 = g.node("0").unwrap();
        assert!(n0.has_image());
        assert!(n0.image.as_ref().unwrap().file.as_ref().unwrap().exists());
        assert!(!g.node("1").unwrap().has_image());
        assert_eq!(g.warnings().len(), 1);
        assert_eq!(g.warnings()[0].index, 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn no_temp_dir_without_a_successful_depiction() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(&tmp);
        let c = collection(vec![vec![0, 0], vec![1, 0]]);

        let g = assemble(&c, &NoDepiction, &RenderConfig::default(), &settings).unwrap();
        assert_eq!(g.warnings().len(), 2);
        assert!(g.depiction_dir().is_none());
        assert!(!settings.temp_dir().exists());

        let only_second = |s: &String, size: DepictionSize| -> DepictionResult {
            if s == "S0" {
                return Err(DepictionError::structure("no coordinates"));
            }
            Ok(Bitmap::new(size.width, size.height))
        };
        let config = RenderConfig::default().with_depiction_size(DepictionSize::new(2, 2));
        let g = assemble(&c, &only_second, &config, &settings).unwrap();
        let dir = g.depiction_dir().unwrap();
        assert!(dir.starts_with(settings.temp_dir()));
        assert!(!dir.join("node-0.png").exists());
        assert!(dir.join("node-1.png").exists());
    }

    #[test]
    fn unwritable_temp_dir_only_costs_files() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let settings = Settings::default()
            .with_working_dir(tmp.path())
            .with_temp_dir(blocker.join("temp"));
        let c = collection(vec![vec![0]]);
        let depicter = |_: &String, size: DepictionSize| -> DepictionResult {
            Ok(Bitmap::new(size.width, size.height))
        };
        let config = RenderConfig::default().with_depiction_size(DepictionSize::new(2, 2));

        let g = assemble(&c, &depicter, &config, &settings).unwrap();
        let image = g.node("0").unwrap().image.as_ref().unwrap();
        assert!(image.file.is_none());
        assert!(g.depiction_dir().is_none());
    }
}
