use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rustc_hash::FxHashSet;
use tracing::{debug, info, trace};

use crate::primitives::bits::BitSequence;
use crate::types::{DsgError, Result, UnitId, VertexId};

use super::graph::Graph;
use super::hierarchy::Hierarchy;
use super::index::VertexIndex;
use super::kill_vector::KillVector;
use super::traversal::{Traversal, TraversalStrategy};
use super::vertex::Vertex;
use super::SubsumptionGraph;

/// Lifecycle of a [`GraphBuilder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuilderState {
    /// Not accepting input; the previous graph, if any, is still readable.
    Closed,
    /// Accepting kill-vectors.
    Input,
    /// Levels sorted, waiting for edges.
    Sorted,
    /// Every vertex placed and linked.
    Complete,
}

impl BuilderState {
    fn as_str(self) -> &'static str {
        match self {
            BuilderState::Closed => "closed",
            BuilderState::Input => "input",
            BuilderState::Sorted => "sorted",
            BuilderState::Complete => "complete",
        }
    }
}

impl fmt::Display for BuilderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-owned working sets for [`DominanceSearch::find_direct_subsumed`].
///
/// One instance can serve any number of searches; the sets are cleared at
/// the start of each call and their allocations reused.
#[derive(Debug, Default)]
pub struct DominanceSearch {
    visited: FxHashSet<VertexId>,
    found: FxHashSet<VertexId>,
    queue: VecDeque<VertexId>,
    comparisons: u64,
}

impl DominanceSearch {
    /// Creates empty working sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dominance tests performed since creation.
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Returns, in ascending id order, the vertices of `graph` that `vector`
    /// dominates with no other dominated vertex of `graph` in between.
    ///
    /// `graph` must already be the transitive reduction of dominance over
    /// its own vertices. A vertex that passes the test has its descendants
    /// tagged and dropped from the result; one that fails has its ancestors
    /// tagged, as none of them can be dominated either. Tagged vertices are
    /// never tested.
    pub fn find_direct_subsumed(
        &mut self,
        graph: &Graph,
        vector: &BitSequence,
        strategy: TraversalStrategy,
    ) -> Vec<VertexId> {
        self.visited.clear();
        self.found.clear();
        for y in Traversal::new(graph, strategy) {
            if !self.visited.insert(y.id()) {
                continue;
            }
            self.comparisons += 1;
            if vector.dominates(y.vector()) {
                self.tag_descendants(graph, y);
                self.found.insert(y.id());
            } else {
                self.tag_ancestors(graph, y);
            }
        }
        let mut direct: Vec<VertexId> = self.found.drain().collect();
        direct.sort_unstable();
        direct
    }

    fn tag_descendants(&mut self, graph: &Graph, from: &Vertex) {
        self.queue.clear();
        self.queue.extend(from.targets());
        while let Some(id) = self.queue.pop_front() {
            self.found.remove(&id);
            if !self.visited.insert(id) {
                continue;
            }
            if let Some(vertex) = graph.vertex(id) {
                self.queue.extend(vertex.targets());
            }
        }
    }

    fn tag_ancestors(&mut self, graph: &Graph, from: &Vertex) {
        self.queue.clear();
        self.queue.extend(from.sources());
        while let Some(id) = self.queue.pop_front() {
            if !self.visited.insert(id) {
                continue;
            }
            if let Some(vertex) = graph.vertex(id) {
                self.queue.extend(vertex.sources());
            }
        }
    }
}

/// Builds a direct subsumption graph from kill-vectors.
///
/// Drive it through `open`, any number of `add_node`/`add_index`,
/// `sort_nodes`, `link_nodes` and `close`; each call outside that order
/// fails with [`DsgError::InvalidState`]. Vertices stay staged inside the
/// builder until their hierarchy level is linked.
#[derive(Debug)]
pub struct GraphBuilder {
    state: BuilderState,
    graph: Graph,
    index: VertexIndex,
    hierarchy: Hierarchy,
    staged: BTreeMap<VertexId, Vertex>,
    next_id: i64,
    test_count: Option<usize>,
    search: DominanceSearch,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a closed builder with empty outputs.
    pub fn new() -> Self {
        Self {
            state: BuilderState::Closed,
            graph: Graph::new(),
            index: VertexIndex::new(),
            hierarchy: Hierarchy::new(),
            staged: BTreeMap::new(),
            next_id: 0,
            test_count: None,
            search: DominanceSearch::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BuilderState {
        self.state
    }

    fn expect_state(&self, expected: BuilderState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DsgError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    /// Discards previous outputs and starts accepting input.
    pub fn open(&mut self) -> Result<()> {
        self.expect_state(BuilderState::Closed, "open")?;
        self.graph.clear();
        self.index.clear();
        self.hierarchy.clear();
        self.staged.clear();
        self.next_id = 0;
        self.test_count = None;
        self.search = DominanceSearch::new();
        self.state = BuilderState::Input;
        debug!("builder.open");
        Ok(())
    }

    /// Creates a cluster vertex for `kill_vector` and maps its unit onto it.
    ///
    /// Every vector fed to one build must have the same length.
    pub fn add_node(&mut self, kill_vector: &KillVector) -> Result<VertexId> {
        self.expect_state(BuilderState::Input, "add_node")?;
        let len = kill_vector.test_count();
        match self.test_count {
            Some(expected) if expected != len => {
                return Err(DsgError::LengthMismatch {
                    left: expected,
                    right: len,
                })
            }
            Some(_) => {}
            None => self.test_count = Some(len),
        }
        if self.index.has_unit(kill_vector.unit()) {
            return Err(DsgError::DuplicateUnit(kill_vector.unit()));
        }
        let id = VertexId(self.next_id);
        self.index.register_vertex(id)?;
        self.index.add(kill_vector.unit(), id)?;
        self.hierarchy.add(id, kill_vector.quantity());
        self.staged.insert(
            id,
            Vertex::new(id, kill_vector.vector().clone(), kill_vector.quantity()),
        );
        self.next_id += 1;
        trace!(vertex = id.0, unit = kill_vector.unit().0, degree = kill_vector.quantity(), "builder.add_node");
        Ok(id)
    }

    /// Maps one more unit onto an existing cluster vertex.
    pub fn add_index(&mut self, unit: UnitId, vertex: VertexId) -> Result<()> {
        self.expect_state(BuilderState::Input, "add_index")?;
        self.index.add(unit, vertex)
    }

    /// Orders the hierarchy levels; no more input is accepted afterwards.
    pub fn sort_nodes(&mut self) -> Result<()> {
        self.expect_state(BuilderState::Input, "sort_nodes")?;
        self.hierarchy.sort();
        self.state = BuilderState::Sorted;
        debug!(
            levels = self.hierarchy.number_of_levels(),
            vertices = self.staged.len(),
            "builder.sorted"
        );
        Ok(())
    }

    /// Places every staged vertex into the graph, one degree level at a time
    /// starting from the lowest, linking each to the clusters it directly
    /// dominates.
    ///
    /// A vertex can only dominate vertices of lower degree, so all candidate
    /// targets of a level are placed before that level is searched. Searches
    /// within a level read only the graph as it stood before the level.
    pub fn link_nodes(&mut self, strategy: TraversalStrategy) -> Result<()> {
        self.expect_state(BuilderState::Sorted, "link_nodes")?;
        let levels = self.hierarchy.number_of_levels();
        for level in 0..levels {
            let members = self.hierarchy.get_vertices_at(level)?;
            let mut pending = Vec::with_capacity(members.len());
            for &id in members {
                let vertex = self.staged.get(&id).ok_or(DsgError::UnknownVertex(id))?;
                let targets =
                    self.search
                        .find_direct_subsumed(&self.graph, vertex.vector(), strategy);
                trace!(vertex = id.0, targets = targets.len(), "builder.vertex_searched");
                pending.push((id, targets));
            }
            let mut edges = 0usize;
            for (id, _) in &pending {
                let vertex = self.staged.remove(id).ok_or(DsgError::UnknownVertex(*id))?;
                self.graph.add(vertex)?;
            }
            for (id, targets) in pending {
                for target in targets {
                    self.graph.link(id, target)?;
                    edges += 1;
                }
            }
            self.graph.update_roots();
            self.graph.update_leafs();
            debug!(
                level,
                degree = self.hierarchy.degrees()[level],
                edges,
                comparisons = self.search.comparisons(),
                "builder.level_linked"
            );
        }
        self.state = BuilderState::Complete;
        info!(
            vertices = self.graph.len(),
            edges = self.graph.edge_count(),
            comparisons = self.search.comparisons(),
            strategy = %strategy,
            "builder.linked"
        );
        Ok(())
    }

    /// Finishes the build; outputs stay readable until the next `open`.
    pub fn close(&mut self) -> Result<()> {
        self.expect_state(BuilderState::Complete, "close")?;
        self.state = BuilderState::Closed;
        debug!("builder.close");
        Ok(())
    }

    /// Dominance tests performed by the current build.
    pub fn comparisons(&self) -> u64 {
        self.search.comparisons()
    }

    /// Graph built so far.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Unit-to-vertex index built so far.
    pub fn index(&self) -> &VertexIndex {
        &self.index
    }

    /// Degree hierarchy built so far.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Hands over the outputs of a finished build.
    pub fn finish(self) -> Result<SubsumptionGraph> {
        if self.state != BuilderState::Closed || !self.staged.is_empty() {
            return Err(DsgError::InvalidState {
                operation: "finish",
                state: self.state.as_str(),
            });
        }
        Ok(SubsumptionGraph {
            graph: self.graph,
            index: self.index,
            hierarchy: self.hierarchy,
        })
    }
}
