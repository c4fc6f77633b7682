#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::io::Cursor;

use dsgraph::{
    admin::{verify_graph, VerifyLevel},
    cli::build_from_kill_vectors,
    primitives::bits::BitSequence,
    storage::{GraphReader, GraphWriter, KillVector, SubsumptionGraph, TraversalStrategy},
    types::UnitId,
};
use proptest::prelude::*;

fn arb_vectors() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (1usize..=7).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), width), 0..24)
    })
}

fn build(rows: &[Vec<bool>], strategy: TraversalStrategy) -> SubsumptionGraph {
    let kvs = rows.iter().enumerate().map(|(unit, bits)| {
        KillVector::new(UnitId(unit as i64), BitSequence::from_bits(bits.iter().copied()))
    });
    build_from_kill_vectors(kvs, strategy)
        .expect("build graph")
        .graph
}

fn strictly_dominates(a: &BitSequence, b: &BitSequence) -> bool {
    a != b && a.dominates(b)
}

/// Cover relation over the distinct vectors, computed pairwise.
fn brute_force_edges(built: &SubsumptionGraph) -> BTreeSet<(i64, i64)> {
    let vertices: Vec<_> = built.graph.vertices().collect();
    let mut edges = BTreeSet::new();
    for a in &vertices {
        for b in &vertices {
            if !strictly_dominates(a.vector(), b.vector()) {
                continue;
            }
            let covered = vertices.iter().any(|c| {
                strictly_dominates(a.vector(), c.vector())
                    && strictly_dominates(c.vector(), b.vector())
            });
            if !covered {
                edges.insert((a.id().0, b.id().0));
            }
        }
    }
    edges
}

fn edge_set(built: &SubsumptionGraph) -> BTreeSet<(i64, i64)> {
    built
        .graph
        .edges()
        .map(|edge| (edge.source().0, edge.target().0))
        .collect()
}

proptest! {
    #[test]
    fn prop_edges_are_the_cover_relation(rows in arb_vectors()) {
        for strategy in TraversalStrategy::ALL {
            let built = build(&rows, strategy);
            prop_assert_eq!(edge_set(&built), brute_force_edges(&built));
        }
    }

    #[test]
    fn prop_clusters_hold_identical_vectors(rows in arb_vectors()) {
        let built = build(&rows, TraversalStrategy::Unordered);
        let distinct: BTreeSet<&Vec<bool>> = rows.iter().collect();
        prop_assert_eq!(built.graph.len(), distinct.len());
        prop_assert_eq!(built.index.number_of_units(), rows.len());
        for (unit, vertex) in built.index.iter() {
            let expected = BitSequence::from_bits(rows[unit.0 as usize].iter().copied());
            let vertex = built.graph.vertex(vertex).expect("indexed vertex exists");
            prop_assert_eq!(vertex.vector(), &expected);
        }
    }

    #[test]
    fn prop_roots_and_leafs_match_degrees(rows in arb_vectors()) {
        let built = build(&rows, TraversalStrategy::TopDown);
        for vertex in built.graph.vertices() {
            prop_assert_eq!(built.graph.roots().contains(&vertex.id()), vertex.in_degree() == 0);
            prop_assert_eq!(built.graph.leafs().contains(&vertex.id()), vertex.out_degree() == 0);
        }
        prop_assert!(verify_graph(&built, VerifyLevel::Full).success);
    }

    #[test]
    fn prop_codec_preserves_graph(rows in arb_vectors()) {
        let built = build(&rows, TraversalStrategy::BottomUp);
        let mut writer = GraphWriter::new(Vec::new());
        writer.write(&built.graph, &built.index).expect("write");
        let bytes = writer.into_inner();
        let loaded = GraphReader::new(Cursor::new(bytes)).read().expect("read");
        prop_assert_eq!(edge_set(&loaded), edge_set(&built));
        prop_assert_eq!(
            loaded.index.iter().collect::<Vec<_>>(),
            built.index.iter().collect::<Vec<_>>()
        );
        prop_assert_eq!(loaded.hierarchy.degrees(), built.hierarchy.degrees());
    }
}
