use scaffview_core::{
    AdjacencyMatrix, Bitmap, DepictionError, DepictionResult, DepictionSize, Error,
    MatrixCollection, MatrixNode, NoDepiction, RenderConfig, ScaffoldGraph, Settings, assemble,
    assemble_into,
};

fn collection(matrix: Vec<Vec<u8>>) -> MatrixCollection<String> {
    let nodes = (0..matrix.len())
        .map(|i| MatrixNode {
            level: (i / 2) as u32,
            structure: format!("scaffold-{i}"),
        })
        .collect();
    MatrixCollection::new(matrix, nodes)
}

fn settings(tmp: &tempfile::TempDir) -> Settings {
    Settings::default().with_working_dir(tmp.path())
}

fn small_config() -> RenderConfig {
    RenderConfig::default().with_depiction_size(DepictionSize::new(4, 4))
}

/// Deterministic pseudo-random 0/1 matrix (xorshift), deliberately not symmetric.
fn pseudo_random_matrix(n: usize, mut seed: u64) -> Vec<Vec<u8>> {
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % 3 == 0) as u8
    };
    (0..n).map(|_| (0..n).map(|_| next()).collect()).collect()
}

fn lower_triangle_ones(m: &[Vec<u8>]) -> usize {
    m.iter()
        .enumerate()
        .map(|(r, row)| row[..=r].iter().filter(|v| **v == 1).count())
        .sum()
}

#[test]
fn node_ids_and_edge_counts_follow_the_lower_triangle() {
    let tmp = tempfile::tempdir().unwrap();
    for (n, seed) in [(1usize, 7u64), (4, 11), (9, 23), (16, 42)] {
        let matrix = pseudo_random_matrix(n, seed);
        let expected_edges = lower_triangle_ones(&matrix);
        let c = collection(matrix.clone());
        let g = assemble(&c, &NoDepiction, &small_config(), &settings(&tmp)).unwrap();

        let expected_ids: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        assert_eq!(g.node_ids(), expected_ids);
        assert_eq!(g.edge_count(), expected_edges, "n={n} seed={seed}");

        for e in g.edges() {
            let r: usize = e.source.parse().unwrap();
            let c: usize = e.target.parse().unwrap();
            assert!(c <= r, "edge {} reads the upper triangle", e.id);
            assert_eq!(matrix[r][c], 1);
        }
    }
}

#[test]
fn two_node_self_loop_example() {
    let tmp = tempfile::tempdir().unwrap();
    let c = collection(vec![vec![1, 0], vec![0, 0]]);
    let g = assemble(&c, &NoDepiction, &small_config(), &settings(&tmp)).unwrap();

    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
    let e = g.edges().next().unwrap();
    assert_eq!((e.source.as_str(), e.target.as_str()), ("0", "0"));
}

#[test]
fn diagonal_one_yields_exactly_one_self_loop() {
    let tmp = tempfile::tempdir().unwrap();
    let mut m = vec![vec![0u8; 4]; 4];
    m[2][2] = 1;
    m[3][0] = 1;
    let c = collection(m);
    let g = assemble(&c, &NoDepiction, &small_config(), &settings(&tmp)).unwrap();

    let loops: Vec<_> = g.edges().filter(|e| e.is_self_loop()).collect();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].source, "2");
}

#[test]
fn interpretation_is_idempotent() {
    let m = pseudo_random_matrix(12, 99);
    let a = AdjacencyMatrix::from_rows(m.clone()).unwrap();
    let b = AdjacencyMatrix::from_rows(m).unwrap();
    assert_eq!(a.edge_pairs(), b.edge_pairs());
    assert_eq!(a.edges(), a.edges());
}

#[test]
fn labels_follow_config() {
    let tmp = tempfile::tempdir().unwrap();
    let c = collection(vec![vec![0, 0, 0], vec![1, 0, 0], vec![1, 1, 0]]);

    let labelled = assemble(&c, &NoDepiction, &small_config(), &settings(&tmp)).unwrap();
    assert_eq!(
        labelled.node("2").unwrap().label.as_deref(),
        Some("Level: 1; Index: 2")
    );

    let plain = assemble(
        &c,
        &NoDepiction,
        &small_config().with_labels(false),
        &settings(&tmp),
    )
    .unwrap();
    assert!(plain.nodes().all(|n| n.label.is_none()));
}

#[test]
fn failing_depiction_only_affects_its_node() {
    let tmp = tempfile::tempdir().unwrap();
    let m = pseudo_random_matrix(6, 5);
    let expected_edges = lower_triangle_ones(&m);
    let c = collection(m);
    let depicter = |s: &String, size: DepictionSize| -> DepictionResult {
        if s == "scaffold-3" {
            return Err(DepictionError::structure("unsupported stereo element"));
        }
        Ok(Bitmap::from_pixel(
            size.width,
            size.height,
            image::Rgba([0, 0, 0, 255]),
        ))
    };

    let g = assemble(&c, &depicter, &small_config(), &settings(&tmp)).unwrap();
    assert_eq!(g.node_count(), 6);
    assert_eq!(g.edge_count(), expected_edges);
    for n in g.nodes() {
        assert_eq!(n.has_image(), n.id != "3", "node {}", n.id);
    }
    assert_eq!(g.warnings().len(), 1);
    assert_eq!(g.warnings()[0].index, 3);
}

#[test]
fn reusing_a_non_empty_target_fails_and_leaves_it_unchanged() {
    let tmp = tempfile::tempdir().unwrap();
    let first = collection(vec![vec![0, 0], vec![1, 0]]);
    let second = collection(vec![vec![0, 0, 0], vec![1, 0, 0], vec![0, 1, 0]]);

    let mut target = ScaffoldGraph::new("reused");
    assemble_into(
        &first,
        &NoDepiction,
        &small_config(),
        &settings(&tmp),
        &mut target,
    )
    .unwrap();
    let before = target.snapshot();

    let err = assemble_into(
        &second,
        &NoDepiction,
        &small_config(),
        &settings(&tmp),
        &mut target,
    )
    .unwrap_err();
    assert!(matches!(err, Error::NonEmptyTarget { nodes: 2, edges: 1 }));
    assert_eq!(target.snapshot(), before);
}

#[test]
fn empty_target_is_filled_with_config_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let c = collection(vec![vec![0]]);
    let mut target = ScaffoldGraph::new("placeholder");
    let config = small_config()
        .with_graph_id("Sertraline-Scaffold-Tree")
        .with_style_sheet("node { padding: 10px; }");
    assemble_into(&c, &NoDepiction, &config, &settings(&tmp), &mut target).unwrap();

    assert_eq!(target.id(), "Sertraline-Scaffold-Tree");
    assert_eq!(target.presentation().style_sheet, "node { padding: 10px; }");
    assert!(target.presentation().quality);
    assert!(target.presentation().antialias);
}

#[test]
fn structural_errors_are_fatal() {
    let tmp = tempfile::tempdir().unwrap();

    let ragged = MatrixCollection::new(
        vec![vec![0, 0], vec![0]],
        vec![
            MatrixNode {
                level: 0,
                structure: String::new(),
            };
            2
        ],
    );
    assert!(matches!(
        assemble(&ragged, &NoDepiction, &small_config(), &settings(&tmp)),
        Err(Error::InvalidMatrix { .. })
    ));

    let ok = collection(vec![vec![0]]);
    assert!(matches!(
        assemble(
            &ok,
            &NoDepiction,
            &small_config().with_graph_id(""),
            &settings(&tmp)
        ),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn releasing_depictions_removes_temp_files_but_keeps_images() {
    let tmp = tempfile::tempdir().unwrap();
    let c = collection(vec![vec![0, 0], vec![1, 0]]);
    let depicter = |_: &String, size: DepictionSize| -> DepictionResult {
        Ok(Bitmap::new(size.width, size.height))
    };
    let mut g = assemble(&c, &depicter, &small_config(), &settings(&tmp)).unwrap();
    let dir = g.depiction_dir().unwrap().to_path_buf();
    assert!(dir.join("node-0.png").exists());

    g.release_depictions().unwrap();
    assert!(!dir.exists());
    assert!(g.nodes().all(|n| n.has_image()));
    assert!(g.depiction_dir().is_none());
}

#[test]
fn concurrent_assemblies_with_shared_settings_do_not_collide() {
    let tmp = tempfile::tempdir().unwrap();
    let s = settings(&tmp);
    let c = collection(vec![vec![0, 0], vec![1, 0]]);
    let depicter = |_: &String, size: DepictionSize| -> DepictionResult {
        Ok(Bitmap::new(size.width, size.height))
    };
    let a = assemble(&c, &depicter, &small_config(), &s).unwrap();
    let b = assemble(&c, &depicter, &small_config(), &s).unwrap();
    assert_ne!(a.depiction_dir(), b.depiction_dir());
}

#[test]
fn snapshot_serializes_to_json() {
    let tmp = tempfile::tempdir().unwrap();
    let c = collection(vec![vec![0, 0], vec![1, 0]]);
    let g = assemble(&c, &NoDepiction, &small_config(), &settings(&tmp)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&g.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["id"], "Graph");
    assert_eq!(json["nodes"][1]["label"], "Level: 0; Index: 1");
    assert_eq!(json["nodes"][1]["hasImage"], false);
    assert_eq!(json["edges"][0]["source"], "1");
    assert_eq!(json["edges"][0]["target"], "0");
    assert_eq!(json["presentation"]["antialias"], true);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
}
