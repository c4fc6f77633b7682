use std::path::Path;

use serde::Serialize;

use crate::storage::SubsumptionGraph;

use crate::admin::util::{file_size, open_graph};
use crate::admin::Result;

/// Headline counts of a built or loaded graph.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryReport {
    /// Units in the index.
    pub units: u64,
    /// Units whose cluster is killed by at least one test.
    pub killed: u64,
    /// Clusters (vertices).
    pub clusters: u64,
    /// Distinct degrees.
    pub levels: u64,
    /// Direct subsumption edges.
    pub edges: u64,
    /// Clusters with no incoming edge.
    pub roots: u64,
    /// Clusters with no outgoing edge.
    pub leafs: u64,
}

/// How far clustering and pruning cut down the dominance tests.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EfficiencyReport {
    /// Pairs of units, the naive all-pairs cost.
    pub unit_pairs: u64,
    /// Pairs of clusters after deduplication.
    pub cluster_pairs: u64,
    /// Pairs of clusters on different levels.
    pub cross_level_pairs: u64,
    /// Dominance tests actually performed, when known.
    pub comparisons: Option<u64>,
    /// Direct subsumption edges.
    pub edges: u64,
}

/// Graph file statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Path of the graph file.
    pub path: String,
    /// Size of the graph file.
    pub size_bytes: u64,
    /// Headline counts.
    pub summary: SummaryReport,
    /// Pair counts.
    pub efficiency: EfficiencyReport,
}

/// Counts units, clusters, levels and edges.
pub fn summarize(built: &SubsumptionGraph) -> SummaryReport {
    let killed = built
        .graph
        .vertices()
        .filter(|v| v.degree() > 0)
        .map(|v| built.index.units_of(v.id()).map_or(0, |units| units.len() as u64))
        .sum();
    SummaryReport {
        units: built.index.number_of_units() as u64,
        killed,
        clusters: built.graph.len() as u64,
        levels: built.hierarchy.number_of_levels() as u64,
        edges: built.graph.edge_count() as u64,
        roots: built.graph.roots().len() as u64,
        leafs: built.graph.leafs().len() as u64,
    }
}

/// Computes pair counts; `comparisons` comes from the build when available.
pub fn efficiency(built: &SubsumptionGraph, comparisons: Option<u64>) -> EfficiencyReport {
    let pairs = |n: u64| n * n.saturating_sub(1) / 2;
    let mut seen = 0u64;
    let mut cross_level_pairs = 0u64;
    for degree in built.hierarchy.degrees().iter().rev() {
        let size = built
            .hierarchy
            .vertices_of_degree(*degree)
            .map_or(0, |level| level.len() as u64);
        cross_level_pairs += seen * size;
        seen += size;
    }
    EfficiencyReport {
        unit_pairs: pairs(built.index.number_of_units() as u64),
        cluster_pairs: pairs(built.graph.len() as u64),
        cross_level_pairs,
        comparisons,
        edges: built.graph.edge_count() as u64,
    }
}

/// Loads the graph file at `path` and reports on it.
pub fn stats(path: impl AsRef<Path>) -> Result<StatsReport> {
    let path = path.as_ref();
    let built = open_graph(path)?;
    Ok(StatsReport {
        path: path.display().to_string(),
        size_bytes: file_size(path)?,
        summary: summarize(&built),
        efficiency: efficiency(&built, None),
    })
}
