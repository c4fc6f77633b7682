use smallvec::SmallVec;

use crate::primitives::bits::BitSequence;
use crate::types::VertexId;

/// Inline capacity for adjacency lists before spilling to the heap.
const INLINE_EDGES: usize = 4;

/// Adjacency list of a vertex.
pub type EdgeList = SmallVec<[Edge; INLINE_EDGES]>;

/// Direct dominance edge: `source` kills a strict superset of what `target` kills,
/// with no cluster strictly in between.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    source: VertexId,
    target: VertexId,
}

impl Edge {
    pub(crate) fn new(source: VertexId, target: VertexId) -> Self {
        Self { source, target }
    }

    /// Dominating endpoint.
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Dominated endpoint.
    pub fn target(&self) -> VertexId {
        self.target
    }
}

/// A cluster of units sharing one kill-vector.
///
/// Edges are recorded on both endpoints so the graph can be walked in either
/// direction without a reverse index.
#[derive(Clone, Debug)]
pub struct Vertex {
    id: VertexId,
    vector: BitSequence,
    degree: u32,
    in_edges: EdgeList,
    out_edges: EdgeList,
}

impl Vertex {
    /// Creates an unlinked vertex.
    pub fn new(id: VertexId, vector: BitSequence, degree: u32) -> Self {
        Self {
            id,
            vector,
            degree,
            in_edges: EdgeList::new(),
            out_edges: EdgeList::new(),
        }
    }

    /// Vertex identifier.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Kill-vector shared by the clustered units.
    pub fn vector(&self) -> &BitSequence {
        &self.vector
    }

    /// Population count recorded when the vertex was created.
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Edges arriving from dominating vertices.
    pub fn in_edges(&self) -> &[Edge] {
        &self.in_edges
    }

    /// Edges leaving towards dominated vertices.
    pub fn out_edges(&self) -> &[Edge] {
        &self.out_edges
    }

    /// Number of incoming edges.
    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    /// Number of outgoing edges.
    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    /// Ids of the vertices this one directly dominates.
    pub fn targets(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges.iter().map(Edge::target)
    }

    /// Ids of the vertices directly dominating this one.
    pub fn sources(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.in_edges.iter().map(Edge::source)
    }

    pub(crate) fn push_out(&mut self, edge: Edge) {
        self.out_edges.push(edge);
    }

    pub(crate) fn push_in(&mut self, edge: Edge) {
        self.in_edges.push(edge);
    }
}
