//! Binary persistence of a subsumption graph and its unit index.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u32 vertex_count
//! vertex_count x { i64 id, u32 degree, u32 bit_count, [u8; ceil(bit_count / 8)] bits }
//! i64 -1, u32 0, u32 0
//! per vertex with out-edges { i64 source, u32 out_degree, out_degree x i64 target }
//! i64 -1, u32 0
//! u32 mapping_count
//! mapping_count x { i64 unit, i64 vertex }
//! i64 -1, i64 -1
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Write};

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::primitives::bits::BitSequence;
use crate::primitives::bytes::{
    len_u32, read_bytes, read_i64_le, read_u32_le, write_i64_le, write_u32_le,
};
use crate::types::{DsgError, Result, UnitId, VertexId};

use super::graph::Graph;
use super::hierarchy::Hierarchy;
use super::index::VertexIndex;
use super::vertex::Vertex;
use super::SubsumptionGraph;

const SENTINEL_ID: i64 = -1;

/// Serializes a graph and its unit index to a byte stream.
pub struct GraphWriter<W: Write> {
    dst: W,
}

impl<W: Write> GraphWriter<W> {
    /// Wraps `dst`.
    pub fn new(dst: W) -> Self {
        Self { dst }
    }

    /// Writes every section and flushes the stream.
    pub fn write(&mut self, graph: &Graph, index: &VertexIndex) -> Result<()> {
        let dst = &mut self.dst;
        write_u32_le(dst, len_u32(graph.len(), "vertex count")?)?;
        for vertex in graph.vertices() {
            write_i64_le(dst, vertex.id().0)?;
            write_u32_le(dst, vertex.degree())?;
            write_u32_le(dst, len_u32(vertex.vector().len(), "bit count")?)?;
            dst.write_all(vertex.vector().as_bytes())?;
        }
        write_i64_le(dst, SENTINEL_ID)?;
        write_u32_le(dst, 0)?;
        write_u32_le(dst, 0)?;

        for vertex in graph.vertices().filter(|v| v.out_degree() > 0) {
            write_i64_le(dst, vertex.id().0)?;
            write_u32_le(dst, len_u32(vertex.out_degree(), "out degree")?)?;
            for target in vertex.targets() {
                write_i64_le(dst, target.0)?;
            }
        }
        write_i64_le(dst, SENTINEL_ID)?;
        write_u32_le(dst, 0)?;

        write_u32_le(dst, len_u32(index.number_of_units(), "mapping count")?)?;
        for (unit, vertex) in index.iter() {
            write_i64_le(dst, unit.0)?;
            write_i64_le(dst, vertex.0)?;
        }
        write_i64_le(dst, SENTINEL_ID)?;
        write_i64_le(dst, SENTINEL_ID)?;
        dst.flush()?;

        info!(
            vertices = graph.len(),
            edges = graph.edge_count(),
            mappings = index.number_of_units(),
            "codec.write.complete"
        );
        Ok(())
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.dst
    }
}

/// Rebuilds a graph, its unit index and its hierarchy from a byte stream.
///
/// Nothing is returned unless the whole stream decodes; a sentinel inside a
/// declared count, a missing or malformed trailing sentinel, a repeated id
/// or a truncated record fails with [`DsgError::Corruption`], and a
/// reference to an id never declared fails with [`DsgError::UnknownVertex`].
pub struct GraphReader<R: Read> {
    src: R,
}

impl<R: Read> GraphReader<R> {
    /// Wraps `src`.
    pub fn new(src: R) -> Self {
        Self { src }
    }

    /// Decodes one graph.
    pub fn read(&mut self) -> Result<SubsumptionGraph> {
        let vertices = self.read_vertices()?;
        let edges = self.read_edges(&vertices)?;
        let mappings = self.read_mappings(&vertices)?;

        let mut index = VertexIndex::new();
        let mut hierarchy = Hierarchy::new();
        let mut graph = Graph::new();
        for vertex in vertices.into_values() {
            index.register_vertex(vertex.id())?;
            hierarchy.add(vertex.id(), vertex.degree());
            graph.add(vertex)?;
        }
        for (source, target) in &edges {
            graph.link(*source, *target)?;
        }
        graph.update_roots();
        graph.update_leafs();
        hierarchy.sort();
        for (unit, vertex) in mappings {
            index.add(unit, vertex).map_err(|err| match err {
                DsgError::DuplicateUnit(unit) => {
                    DsgError::corruption(format!("unit {unit} mapped twice"))
                }
                other => other,
            })?;
        }

        info!(
            vertices = graph.len(),
            edges = edges.len(),
            mappings = index.number_of_units(),
            "codec.read.complete"
        );
        Ok(SubsumptionGraph {
            graph,
            index,
            hierarchy,
        })
    }

    fn read_vertices(&mut self) -> Result<BTreeMap<VertexId, Vertex>> {
        let src = &mut self.src;
        let count = read_u32_le(src, "vertex count")?;
        let mut vertices = BTreeMap::new();
        for slot in 0..count {
            let id = read_i64_le(src, "vertex id")?;
            if id == SENTINEL_ID {
                return Err(DsgError::corruption(format!(
                    "vertex sentinel at record {slot} of {count}"
                )));
            }
            let degree = read_u32_le(src, "vertex degree")?;
            let bit_count = read_u32_le(src, "vertex bit count")? as usize;
            let bytes = read_bytes(src, bit_count.div_ceil(8), "vertex bits")?;
            let vector = BitSequence::from_bytes(bit_count, &bytes)?;
            let id = VertexId(id);
            if vertices
                .insert(id, Vertex::new(id, vector, degree))
                .is_some()
            {
                return Err(DsgError::corruption(format!("vertex {id} declared twice")));
            }
        }
        let id = read_i64_le(src, "vertex sentinel")?;
        let degree = read_u32_le(src, "vertex sentinel")?;
        let bit_count = read_u32_le(src, "vertex sentinel")?;
        if (id, degree, bit_count) != (SENTINEL_ID, 0, 0) {
            return Err(DsgError::corruption(format!(
                "expected vertex sentinel after {count} vertices, found id {id}"
            )));
        }
        debug!(count, "codec.read.vertices");
        Ok(vertices)
    }

    fn read_edges(
        &mut self,
        vertices: &BTreeMap<VertexId, Vertex>,
    ) -> Result<Vec<(VertexId, VertexId)>> {
        let src = &mut self.src;
        let mut edges = Vec::new();
        let mut sources = FxHashSet::default();
        loop {
            let source = read_i64_le(src, "edge source")?;
            let out_degree = read_u32_le(src, "edge out degree")?;
            if source == SENTINEL_ID {
                if out_degree != 0 {
                    return Err(DsgError::corruption(format!(
                        "edge sentinel carries out degree {out_degree}"
                    )));
                }
                break;
            }
            let source = VertexId(source);
            if !vertices.contains_key(&source) {
                return Err(DsgError::UnknownVertex(source));
            }
            if out_degree == 0 || !sources.insert(source) {
                return Err(DsgError::corruption(format!(
                    "malformed edge record for vertex {source}"
                )));
            }
            for _ in 0..out_degree {
                let target = VertexId(read_i64_le(src, "edge target")?);
                if !vertices.contains_key(&target) {
                    return Err(DsgError::UnknownVertex(target));
                }
                edges.push((source, target));
            }
        }
        debug!(count = edges.len(), "codec.read.edges");
        Ok(edges)
    }

    fn read_mappings(
        &mut self,
        vertices: &BTreeMap<VertexId, Vertex>,
    ) -> Result<Vec<(UnitId, VertexId)>> {
        let src = &mut self.src;
        let count = read_u32_le(src, "mapping count")?;
        let mut mappings = Vec::new();
        for slot in 0..count {
            let unit = read_i64_le(src, "mapping unit")?;
            let vertex = read_i64_le(src, "mapping vertex")?;
            if (unit, vertex) == (SENTINEL_ID, SENTINEL_ID) {
                return Err(DsgError::corruption(format!(
                    "mapping sentinel at record {slot} of {count}"
                )));
            }
            let vertex = VertexId(vertex);
            if !vertices.contains_key(&vertex) {
                return Err(DsgError::UnknownVertex(vertex));
            }
            mappings.push((UnitId(unit), vertex));
        }
        let unit = read_i64_le(src, "mapping sentinel")?;
        let vertex = read_i64_le(src, "mapping sentinel")?;
        if (unit, vertex) != (SENTINEL_ID, SENTINEL_ID) {
            return Err(DsgError::corruption(format!(
                "expected mapping sentinel after {count} mappings"
            )));
        }
        Ok(mappings)
    }
}
