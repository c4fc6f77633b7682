#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;

use dsgraph::{
    admin::{efficiency, stats, summarize, verify, verify_graph, VerifyLevel},
    cli::{build_from_reader, generate, GenerateConfig},
    storage::{BuildOptions, SubsumptionGraph, TraversalStrategy},
    types::{DsgError, UnitId, VertexId},
};
use tempfile::TempDir;

const RESULTS: &str = "\
1 [2]: t0 t1
2 [1]: t0
3 [0]:
4 [2]: t0 t2
5 [1]: t2
6 [2]: t0 t1
not a result line
";

fn options(strategy: TraversalStrategy) -> BuildOptions {
    BuildOptions::new().test_count(3).strategy(strategy)
}

fn edge_set(built: &SubsumptionGraph) -> BTreeSet<(i64, i64)> {
    built
        .graph
        .edges()
        .map(|edge| (edge.source().0, edge.target().0))
        .collect()
}

fn ids(set: &BTreeSet<VertexId>) -> Vec<i64> {
    set.iter().map(|id| id.0).collect()
}

#[test]
fn results_build_into_direct_edges_for_every_strategy() {
    for strategy in TraversalStrategy::ALL {
        let outcome =
            build_from_reader(Cursor::new(RESULTS), &options(strategy)).expect("build graph");
        let built = &outcome.graph;

        // 0:110 1:100 2:000 3:101 4:001; unit 6 joins cluster 0.
        assert_eq!(
            edge_set(built),
            BTreeSet::from([(0, 1), (1, 2), (3, 1), (3, 4), (4, 2)]),
            "strategy {strategy}"
        );
        assert_eq!(ids(built.graph.roots()), vec![0, 3]);
        assert_eq!(ids(built.graph.leafs()), vec![2]);
        assert_eq!(
            built.index.units_of(VertexId(0)),
            Some(&[UnitId(1), UnitId(6)][..])
        );
        assert_eq!(outcome.units, 6);
        assert_eq!(outcome.killed, 5);
        assert_eq!(outcome.ingest.lines, 7);
        assert_eq!(outcome.ingest.parsed, 6);
        assert_eq!(outcome.ingest.skipped, 1);
        assert_eq!(built.hierarchy.degrees(), &[0, 1, 2]);
    }
}

#[test]
fn pair_counts_reflect_clustering() {
    let outcome = build_from_reader(
        Cursor::new(RESULTS),
        &options(TraversalStrategy::TopDown),
    )
    .expect("build graph");
    let report = efficiency(&outcome.graph, Some(outcome.comparisons));
    assert_eq!(report.unit_pairs, 15);
    assert_eq!(report.cluster_pairs, 10);
    assert_eq!(report.cross_level_pairs, 8);
    assert_eq!(report.edges, 5);
    assert!(report.comparisons.expect("comparisons recorded") <= report.cross_level_pairs);
}

#[test]
fn saved_graph_loads_back_identically() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("results_graph.dat");
    let outcome = build_from_reader(
        Cursor::new(RESULTS),
        &options(TraversalStrategy::BottomUp),
    )
    .expect("build graph");
    outcome.graph.save(&path).expect("save graph");

    let loaded = SubsumptionGraph::load(&path).expect("load graph");
    assert_eq!(edge_set(&loaded), edge_set(&outcome.graph));
    assert_eq!(
        loaded.index.iter().collect::<Vec<_>>(),
        outcome.graph.index.iter().collect::<Vec<_>>()
    );
    assert_eq!(loaded.hierarchy.degrees(), outcome.graph.hierarchy.degrees());
    assert_eq!(loaded.graph.roots(), outcome.graph.graph.roots());
    assert_eq!(loaded.graph.leafs(), outcome.graph.graph.leafs());
    for vertex in outcome.graph.graph.vertices() {
        let restored = loaded.graph.vertex(vertex.id()).expect("vertex restored");
        assert_eq!(restored.vector(), vertex.vector());
        assert_eq!(restored.degree(), vertex.degree());
    }
    assert_eq!(summarize(&loaded), summarize(&outcome.graph));

    let report = verify_graph(&loaded, VerifyLevel::Full);
    assert!(report.success, "findings: {:?}", report.findings);
}

#[test]
fn generate_writes_next_to_input_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("results.txt");
    fs::write(&input, RESULTS).expect("write results");

    let mut cfg = GenerateConfig::new(&input);
    cfg.options = options(TraversalStrategy::Unordered);
    let done = generate(&cfg).expect("generate");
    assert_eq!(done.output, dir.path().join("results.txt_graph.dat"));

    let report = stats(&done.output).expect("stats");
    assert_eq!(report.summary.units, 6);
    assert_eq!(report.summary.clusters, 5);
    assert_eq!(report.efficiency.comparisons, None);
    assert_eq!(report.size_bytes, fs::metadata(&done.output).unwrap().len());

    let verified = verify(&done.output, VerifyLevel::Full).expect("verify");
    assert!(verified.success);
}

#[test]
fn truncated_file_is_corruption() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("graph.dat");
    let outcome = build_from_reader(
        Cursor::new(RESULTS),
        &options(TraversalStrategy::Unordered),
    )
    .expect("build graph");
    outcome.graph.save(&path).expect("save graph");

    let bytes = fs::read(&path).expect("read graph");
    fs::write(&path, &bytes[..bytes.len() / 2]).expect("truncate");
    assert!(matches!(
        SubsumptionGraph::load(&path),
        Err(DsgError::Corruption(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    assert!(matches!(
        SubsumptionGraph::load(dir.path().join("absent.dat")),
        Err(DsgError::Io(_))
    ));
}

#[test]
fn generate_rejects_missing_input() {
    let dir = TempDir::new().expect("tempdir");
    let cfg = GenerateConfig::new(dir.path().join("absent.txt"));
    assert!(generate(&cfg).is_err());
}
