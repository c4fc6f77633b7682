use std::collections::{BTreeMap, VecDeque};

use crate::types::{DsgError, Result, VertexId};

/// Groups vertex ids by degree so the builder can link one level at a time.
///
/// Within a level ids are kept newest first. Level indexes refer to the
/// distinct degrees in ascending order and are only valid after [`sort`].
///
/// [`sort`]: Hierarchy::sort
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    levels: BTreeMap<u32, VecDeque<VertexId>>,
    degrees: Vec<u32>,
    sorted: bool,
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `vertex` at `degree`, ahead of the ids already there.
    pub fn add(&mut self, vertex: VertexId, degree: u32) {
        let level = self.levels.entry(degree).or_insert_with(|| {
            self.degrees.push(degree);
            self.sorted = false;
            VecDeque::new()
        });
        level.push_front(vertex);
    }

    /// Orders the distinct degrees ascending.
    pub fn sort(&mut self) {
        self.degrees.sort_unstable();
        self.sorted = true;
    }

    /// Whether [`Self::sort`] ran after the last new degree was seen.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Vertex ids on the `level`-th smallest degree.
    ///
    /// Fails with [`DsgError::InvalidState`] until [`Self::sort`] has run
    /// over every degree seen.
    pub fn get_vertices_at(&self, level: usize) -> Result<&VecDeque<VertexId>> {
        if !self.sorted {
            return Err(DsgError::InvalidState {
                operation: "get_vertices_at",
                state: "unsorted",
            });
        }
        let levels = self.degrees.len();
        let degree = self
            .degrees
            .get(level)
            .ok_or(DsgError::LevelOutOfRange { level, levels })?;
        self.levels
            .get(degree)
            .ok_or(DsgError::LevelOutOfRange { level, levels })
    }

    /// Vertex ids recorded at `degree`, if any.
    pub fn vertices_of_degree(&self, degree: u32) -> Option<&VecDeque<VertexId>> {
        self.levels.get(&degree)
    }

    /// Distinct degrees, ascending once sorted.
    pub fn degrees(&self) -> &[u32] {
        &self.degrees
    }

    /// Number of distinct degrees.
    pub fn number_of_levels(&self) -> usize {
        self.degrees.len()
    }

    /// Number of vertex ids across all levels.
    pub fn number_of_vertices(&self) -> usize {
        self.levels.values().map(VecDeque::len).sum()
    }

    /// Drops every level.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.degrees.clear();
        self.sorted = false;
    }
}
