use std::collections::{btree_map, BTreeMap};

use crate::types::{DsgError, Result, UnitId, VertexId};

/// Maps unit ids onto the cluster vertex that holds them.
///
/// Vertices are registered first (with no units) and units are attached
/// afterwards, so a cluster always knows its members in arrival order.
#[derive(Clone, Debug, Default)]
pub struct VertexIndex {
    units: BTreeMap<UnitId, VertexId>,
    clusters: BTreeMap<VertexId, Vec<UnitId>>,
}

impl VertexIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cluster vertex that currently holds no unit.
    pub fn register_vertex(&mut self, vertex: VertexId) -> Result<()> {
        match self.clusters.entry(vertex) {
            btree_map::Entry::Occupied(_) => Err(DsgError::DuplicateVertex(vertex)),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(Vec::new());
                Ok(())
            }
        }
    }

    /// Maps `unit` onto the registered `vertex`.
    pub fn add(&mut self, unit: UnitId, vertex: VertexId) -> Result<()> {
        let members = self
            .clusters
            .get_mut(&vertex)
            .ok_or(DsgError::UnknownVertex(vertex))?;
        match self.units.entry(unit) {
            btree_map::Entry::Occupied(_) => Err(DsgError::DuplicateUnit(unit)),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(vertex);
                members.push(unit);
                Ok(())
            }
        }
    }

    /// Whether `vertex` has been registered.
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.clusters.contains_key(&vertex)
    }

    /// Whether `unit` has been mapped.
    pub fn has_unit(&self, unit: UnitId) -> bool {
        self.units.contains_key(&unit)
    }

    /// Vertex holding `unit`.
    pub fn vertex_of_unit(&self, unit: UnitId) -> Option<VertexId> {
        self.units.get(&unit).copied()
    }

    /// Units held by `vertex`, in the order they were added.
    pub fn units_of(&self, vertex: VertexId) -> Option<&[UnitId]> {
        self.clusters.get(&vertex).map(Vec::as_slice)
    }

    /// Number of mapped units.
    pub fn number_of_units(&self) -> usize {
        self.units.len()
    }

    /// Number of registered vertices.
    pub fn number_of_vertices(&self) -> usize {
        self.clusters.len()
    }

    /// `(unit, vertex)` pairs in ascending unit order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, VertexId)> + '_ {
        self.units.iter().map(|(unit, vertex)| (*unit, *vertex))
    }

    /// Registered vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.clusters.keys().copied()
    }

    /// Drops every mapping.
    pub fn clear(&mut self) {
        self.units.clear();
        self.clusters.clear();
    }
}
