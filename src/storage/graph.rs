use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::types::{DsgError, Result, VertexId};

use super::vertex::{Edge, Vertex};

/// Direct subsumption graph: cluster vertices keyed by id plus the derived
/// root (no incoming edge) and leaf (no outgoing edge) sets.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: BTreeMap<VertexId, Vertex>,
    roots: BTreeSet<VertexId>,
    leafs: BTreeSet<VertexId>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `vertex`, classifying it as root and/or leaf from
    /// its current edge lists.
    pub fn add(&mut self, vertex: Vertex) -> Result<()> {
        let id = vertex.id();
        let btree_map::Entry::Vacant(slot) = self.vertices.entry(id) else {
            return Err(DsgError::DuplicateVertex(id));
        };
        if vertex.in_degree() == 0 {
            self.roots.insert(id);
        }
        if vertex.out_degree() == 0 {
            self.leafs.insert(id);
        }
        slot.insert(vertex);
        Ok(())
    }

    /// Records the edge `source -> target` on both endpoints.
    ///
    /// Duplicate edges are not filtered; callers link each pair at most once.
    pub fn link(&mut self, source: VertexId, target: VertexId) -> Result<()> {
        if source == target {
            return Err(DsgError::SelfLoop(source));
        }
        if !self.vertices.contains_key(&target) {
            return Err(DsgError::UnknownVertex(target));
        }
        let edge = Edge::new(source, target);
        self.vertices
            .get_mut(&source)
            .ok_or(DsgError::UnknownVertex(source))?
            .push_out(edge);
        if let Some(vertex) = self.vertices.get_mut(&target) {
            vertex.push_in(edge);
        }
        self.leafs.remove(&source);
        self.roots.remove(&target);
        trace!(source = source.0, target = target.0, "graph.link");
        Ok(())
    }

    /// Drops every root that has gained an incoming edge.
    pub fn update_roots(&mut self) {
        let vertices = &self.vertices;
        self.roots
            .retain(|id| vertices.get(id).is_some_and(|v| v.in_degree() == 0));
    }

    /// Drops every leaf that has gained an outgoing edge.
    pub fn update_leafs(&mut self) {
        let vertices = &self.vertices;
        self.leafs
            .retain(|id| vertices.get(id).is_some_and(|v| v.out_degree() == 0));
    }

    /// Removes every vertex and edge.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.roots.clear();
        self.leafs.clear();
    }

    /// Vertices without incoming edges.
    pub fn roots(&self) -> &BTreeSet<VertexId> {
        &self.roots
    }

    /// Vertices without outgoing edges.
    pub fn leafs(&self) -> &BTreeSet<VertexId> {
        &self.leafs
    }

    /// Whether `id` has been added.
    pub fn has_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Looks up a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graph holds no vertex.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.vertices.values().map(Vertex::out_degree).sum()
    }

    /// Vertices in ascending id order.
    pub fn vertices(&self) -> btree_map::Values<'_, VertexId, Vertex> {
        self.vertices.values()
    }

    /// Every edge, grouped by source in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.vertices.values().flat_map(|v| v.out_edges().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::bits::BitSequence;

    fn vertex(id: i64, bits: &str) -> Vertex {
        let vector: BitSequence = bits.parse().unwrap();
        let degree = vector.count_ones();
        Vertex::new(VertexId(id), vector, degree)
    }

    fn assert_roots_and_leafs_consistent(graph: &Graph) {
        for v in graph.vertices() {
            assert_eq!(graph.roots().contains(&v.id()), v.in_degree() == 0);
            assert_eq!(graph.leafs().contains(&v.id()), v.out_degree() == 0);
        }
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut graph = Graph::new();
        graph.add(vertex(0, "10")).unwrap();
        let err = graph.add(vertex(0, "01")).unwrap_err();
        assert!(matches!(err, DsgError::DuplicateVertex(VertexId(0))));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.vertex(VertexId(0)).unwrap().vector().to_string(), "10");
    }

    #[test]
    fn link_records_both_directions() {
        let mut graph = Graph::new();
        graph.add(vertex(0, "110")).unwrap();
        graph.add(vertex(1, "100")).unwrap();
        graph.add(vertex(2, "000")).unwrap();
        graph.link(VertexId(0), VertexId(1)).unwrap();
        graph.link(VertexId(1), VertexId(2)).unwrap();

        let middle = graph.vertex(VertexId(1)).unwrap();
        assert_eq!(middle.sources().collect::<Vec<_>>(), vec![VertexId(0)]);
        assert_eq!(middle.targets().collect::<Vec<_>>(), vec![VertexId(2)]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.roots().iter().copied().collect::<Vec<_>>(), vec![VertexId(0)]);
        assert_eq!(graph.leafs().iter().copied().collect::<Vec<_>>(), vec![VertexId(2)]);
        assert_roots_and_leafs_consistent(&graph);
    }

    #[test]
    fn link_rejects_self_loops_and_unknown_ids() {
        let mut graph = Graph::new();
        graph.add(vertex(0, "1")).unwrap();
        assert!(matches!(
            graph.link(VertexId(0), VertexId(0)),
            Err(DsgError::SelfLoop(VertexId(0)))
        ));
        assert!(matches!(
            graph.link(VertexId(0), VertexId(5)),
            Err(DsgError::UnknownVertex(VertexId(5)))
        ));
        assert!(matches!(
            graph.link(VertexId(5), VertexId(0)),
            Err(DsgError::UnknownVertex(VertexId(5)))
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn adding_prelinked_vertex_uses_its_edge_counts() {
        let mut linked = vertex(3, "11");
        linked.push_out(Edge::new(VertexId(3), VertexId(4)));
        let mut graph = Graph::new();
        graph.add(linked).unwrap();
        assert!(graph.roots().contains(&VertexId(3)));
        assert!(!graph.leafs().contains(&VertexId(3)));
    }

    #[test]
    fn updates_and_clear_keep_sets_consistent() {
        let mut graph = Graph::new();
        for (id, bits) in [(0, "111"), (1, "110"), (2, "011"), (3, "010")] {
            graph.add(vertex(id, bits)).unwrap();
        }
        graph.link(VertexId(0), VertexId(1)).unwrap();
        graph.link(VertexId(0), VertexId(2)).unwrap();
        graph.link(VertexId(1), VertexId(3)).unwrap();
        graph.link(VertexId(2), VertexId(3)).unwrap();
        graph.update_roots();
        graph.update_leafs();
        assert_roots_and_leafs_consistent(&graph);
        assert_eq!(graph.edges().count(), 4);

        graph.clear();
        assert!(graph.is_empty());
        assert!(graph.roots().is_empty());
        assert!(graph.leafs().is_empty());
    }
}
