use std::collections::VecDeque;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::storage::{Graph, SubsumptionGraph};
use crate::types::VertexId;

use crate::admin::util::open_graph;
use crate::admin::Result;

const MAX_FINDINGS: usize = 32;

/// Specifies the depth of verification checks to perform.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Structural checks: edge mirroring, roots and leafs, index and hierarchy.
    Fast,
    /// Structural checks plus dominance: every edge is strict, none is
    /// transitively redundant and every dominated cluster is reachable.
    Full,
}

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Informational message about the verification process.
    Info,
    /// Non-critical issue that may indicate a problem.
    Warning,
    /// Critical issue indicating a malformed graph.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

impl VerifyFinding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Warning,
            message: message.into(),
        }
    }
}

/// Statistics collected during the verification process.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// Vertices examined.
    pub vertices: u64,
    /// Edges examined.
    pub edges: u64,
    /// Unit mappings examined.
    pub units: u64,
    /// Hierarchy levels examined.
    pub levels: u64,
    /// Dominance tests run by the full level.
    pub dominance_tests: u64,
}

/// Complete report of a verification operation.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The verification level that was performed.
    pub level: VerifyLevel,
    /// Whether verification found no error.
    pub success: bool,
    /// List of issues discovered during verification.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the structures examined.
    pub counts: VerifyCounts,
}

/// Loads the graph file at `path` and verifies it.
///
/// # Errors
///
/// Returns an error if the file is missing or does not decode; a file that
/// decodes into an inconsistent graph yields a failed report instead.
pub fn verify(path: impl AsRef<Path>, level: VerifyLevel) -> Result<VerifyReport> {
    let built = open_graph(path.as_ref())?;
    Ok(verify_graph(&built, level))
}

/// Verifies an in-memory graph.
pub fn verify_graph(built: &SubsumptionGraph, level: VerifyLevel) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();

    check_vertices(&built.graph, &mut findings, &mut counts);
    check_edges(&built.graph, &mut findings, &mut counts);
    check_index(built, &mut findings, &mut counts);
    check_hierarchy(built, &mut findings, &mut counts);
    if matches!(level, VerifyLevel::Full) {
        check_dominance(&built.graph, &mut findings, &mut counts);
    }

    VerifyReport {
        level,
        success: !findings
            .iter()
            .any(|f| f.severity == VerifySeverity::Error),
        findings,
        counts,
    }
}

fn check_vertices(graph: &Graph, findings: &mut Vec<VerifyFinding>, counts: &mut VerifyCounts) {
    for vertex in graph.vertices() {
        counts.vertices += 1;
        let id = vertex.id();
        let ones = vertex.vector().count_ones();
        if vertex.degree() != ones {
            push_error(
                findings,
                format!("vertex {id} records degree {} but has {ones} set bits", vertex.degree()),
            );
        }
        if (vertex.in_degree() == 0) != graph.roots().contains(&id) {
            push_error(
                findings,
                format!("vertex {id} root membership disagrees with {} in-edges", vertex.in_degree()),
            );
        }
        if (vertex.out_degree() == 0) != graph.leafs().contains(&id) {
            push_error(
                findings,
                format!("vertex {id} leaf membership disagrees with {} out-edges", vertex.out_degree()),
            );
        }
    }
    for id in graph.roots().iter().chain(graph.leafs()) {
        if !graph.has_vertex(*id) {
            push_error(findings, format!("root/leaf set references missing vertex {id}"));
        }
    }
}

fn check_edges(graph: &Graph, findings: &mut Vec<VerifyFinding>, counts: &mut VerifyCounts) {
    for vertex in graph.vertices() {
        let id = vertex.id();
        let mut targets = FxHashSet::default();
        for edge in vertex.out_edges() {
            counts.edges += 1;
            let target = edge.target();
            if edge.source() != id {
                push_error(
                    findings,
                    format!("out-edge of vertex {id} names source {}", edge.source()),
                );
            }
            if target == id {
                push_error(findings, format!("self loop on vertex {id}"));
            }
            if !targets.insert(target) {
                push_error(findings, format!("duplicate edge {id} -> {target}"));
            }
            match graph.vertex(target) {
                Some(t) if t.in_edges().contains(edge) => {}
                Some(_) => push_error(
                    findings,
                    format!("edge {id} -> {target} missing from target in-edges"),
                ),
                None => push_error(
                    findings,
                    format!("edge {id} -> {target} references missing vertex"),
                ),
            }
        }
        for edge in vertex.in_edges() {
            let source = edge.source();
            let mirrored = graph
                .vertex(source)
                .is_some_and(|s| s.out_edges().contains(edge));
            if edge.target() != id || !mirrored {
                push_error(
                    findings,
                    format!("in-edge {source} -> {} of vertex {id} has no matching out-edge", edge.target()),
                );
            }
        }
        if findings.len() >= MAX_FINDINGS {
            break;
        }
    }
}

fn check_index(built: &SubsumptionGraph, findings: &mut Vec<VerifyFinding>, counts: &mut VerifyCounts) {
    for (unit, vertex) in built.index.iter() {
        counts.units += 1;
        if !built.graph.has_vertex(vertex) {
            push_error(findings, format!("unit {unit} maps to missing vertex {vertex}"));
        }
    }
    for vertex in built.index.vertices() {
        if !built.graph.has_vertex(vertex) {
            push_error(findings, format!("index registers missing vertex {vertex}"));
        }
    }
    for vertex in built.graph.vertices() {
        let holds_units = built
            .index
            .units_of(vertex.id())
            .is_some_and(|units| !units.is_empty());
        if !holds_units {
            push_warning(findings, format!("cluster {} holds no unit", vertex.id()));
        }
    }
}

fn check_hierarchy(
    built: &SubsumptionGraph,
    findings: &mut Vec<VerifyFinding>,
    counts: &mut VerifyCounts,
) {
    let mut placed = FxHashSet::default();
    for &degree in built.hierarchy.degrees() {
        counts.levels += 1;
        let Some(level) = built.hierarchy.vertices_of_degree(degree) else {
            continue;
        };
        for &id in level {
            if !placed.insert(id) {
                push_error(findings, format!("vertex {id} appears on several hierarchy levels"));
            }
            match built.graph.vertex(id) {
                Some(vertex) if vertex.degree() == degree => {}
                Some(vertex) => push_error(
                    findings,
                    format!("vertex {id} of degree {} filed under degree {degree}", vertex.degree()),
                ),
                None => push_error(findings, format!("hierarchy references missing vertex {id}")),
            }
        }
    }
    for vertex in built.graph.vertices() {
        if !placed.contains(&vertex.id()) {
            push_error(findings, format!("vertex {} missing from hierarchy", vertex.id()));
        }
    }
}

fn check_dominance(graph: &Graph, findings: &mut Vec<VerifyFinding>, counts: &mut VerifyCounts) {
    let reach: FxHashMap<VertexId, FxHashSet<VertexId>> = graph
        .vertices()
        .map(|v| (v.id(), descendants(graph, v.id())))
        .collect();

    for vertex in graph.vertices() {
        let id = vertex.id();
        let below = &reach[&id];
        if below.contains(&id) {
            push_error(findings, format!("vertex {id} lies on a cycle"));
        }
        for target in vertex.targets() {
            let Some(t) = graph.vertex(target) else {
                continue;
            };
            counts.dominance_tests += 1;
            if !vertex.vector().dominates(t.vector()) || t.vector().dominates(vertex.vector()) {
                push_error(findings, format!("edge {id} -> {target} is not a strict dominance"));
            }
            let redundant = vertex
                .targets()
                .filter(|other| *other != target)
                .any(|other| reach.get(&other).is_some_and(|r| r.contains(&target)));
            if redundant {
                push_error(findings, format!("edge {id} -> {target} is transitively redundant"));
            }
        }
        for other in graph.vertices() {
            if other.id() == id {
                continue;
            }
            counts.dominance_tests += 1;
            let strictly = vertex.vector().dominates(other.vector())
                && !other.vector().dominates(vertex.vector());
            if strictly && !below.contains(&other.id()) {
                push_error(
                    findings,
                    format!("vertex {id} dominates {} but no path links them", other.id()),
                );
            }
        }
        if findings.len() >= MAX_FINDINGS {
            break;
        }
    }
}

fn descendants(graph: &Graph, from: VertexId) -> FxHashSet<VertexId> {
    let mut seen = FxHashSet::default();
    let mut queue: VecDeque<VertexId> = graph
        .vertex(from)
        .map(|v| v.targets().collect())
        .unwrap_or_default();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(vertex) = graph.vertex(id) {
            queue.extend(vertex.targets());
        }
    }
    seen
}

fn push_error(findings: &mut Vec<VerifyFinding>, message: impl Into<String>) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding::error(message.into()));
    }
}

fn push_warning(findings: &mut Vec<VerifyFinding>, message: impl Into<String>) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding::warning(message.into()));
    }
}
