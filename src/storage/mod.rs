//! Cluster graph model, its builder and its on-disk form.
//!
//! Kill-vectors enter through [`GraphBuilder`], are grouped into [`Vertex`]
//! clusters, ordered by [`Hierarchy`] level and linked into a [`Graph`] whose
//! edges are the direct dominance relation. [`GraphWriter`] and
//! [`GraphReader`] persist the result together with the [`VertexIndex`].

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::types::Result;

mod builder;
mod codec;
mod graph;
mod hierarchy;
mod index;
mod kill_vector;
mod options;
mod traversal;
mod vertex;

/// Incremental construction of the direct subsumption graph.
pub use builder::{BuilderState, DominanceSearch, GraphBuilder};
/// Binary persistence.
pub use codec::{GraphReader, GraphWriter};
pub use graph::Graph;
pub use hierarchy::Hierarchy;
pub use index::VertexIndex;
pub use kill_vector::KillVector;
/// Build configuration.
pub use options::{BuildOptions, DEFAULT_TEST_COUNT};
/// Walk orders over a graph.
pub use traversal::{Traversal, TraversalStrategy};
pub use vertex::{Edge, EdgeList, Vertex};

/// A finished graph together with the unit index and degree hierarchy that
/// describe it.
#[derive(Clone, Debug, Default)]
pub struct SubsumptionGraph {
    /// Clusters and their direct dominance edges.
    pub graph: Graph,
    /// Unit-to-cluster mapping.
    pub index: VertexIndex,
    /// Clusters grouped by degree, sorted.
    pub hierarchy: Hierarchy,
}

impl SubsumptionGraph {
    /// Writes the graph and index to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = GraphWriter::new(BufWriter::new(file));
        writer.write(&self.graph, &self.index)
    }

    /// Reads a graph previously written by [`Self::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        GraphReader::new(BufReader::new(file)).read()
    }
}
