use std::io::Write;
use std::path::Path;

use crate::storage::SubsumptionGraph;

use crate::admin::util::open_graph;
use crate::admin::Result;

/// Writes a readable listing of `built`: counts, vertex ids per hierarchy
/// level, out-edges per vertex and the unit-to-vertex map.
pub fn dump<W: Write>(built: &SubsumptionGraph, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Number of units: {}", built.index.number_of_units())?;
    writeln!(out, "Number of vertices: {}", built.graph.len())?;
    writeln!(out, "Number of levels: {}", built.hierarchy.number_of_levels())?;
    writeln!(out, "Number of edges: {}", built.graph.edge_count())?;
    writeln!(out)?;

    for (level, degree) in built.hierarchy.degrees().iter().enumerate() {
        let ids: Vec<String> = built
            .hierarchy
            .vertices_of_degree(*degree)
            .map(|ids| ids.iter().map(|id| format!("{id};")).collect())
            .unwrap_or_default();
        writeln!(out, "Level ({level}) degree {degree}\n\t{}", ids.join(" "))?;
    }
    writeln!(out)?;

    writeln!(out, "Edges:")?;
    for vertex in built.graph.vertices() {
        write!(out, "\t{} [{}] -->", vertex.id(), vertex.vector())?;
        for target in vertex.targets() {
            write!(out, " {target};")?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;

    writeln!(out, "Index:")?;
    for (unit, vertex) in built.index.iter() {
        writeln!(out, "\t{unit}\t{vertex}")?;
    }
    Ok(())
}

/// Loads the graph file at `path` and dumps it to `out`.
pub fn dump_file<W: Write>(path: impl AsRef<Path>, out: &mut W) -> Result<()> {
    let built = open_graph(path.as_ref())?;
    dump(&built, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_from_kill_vectors;
    use crate::storage::{KillVector, TraversalStrategy};
    use crate::types::UnitId;

    #[test]
    fn dump_lists_levels_edges_and_index() {
        let kvs = [(4, "110"), (5, "100"), (6, "000"), (7, "110")]
            .into_iter()
            .map(|(unit, bits)| KillVector::new(UnitId(unit), bits.parse().unwrap()));
        let built = build_from_kill_vectors(kvs, TraversalStrategy::TopDown)
            .unwrap()
            .graph;
        let mut out = Vec::new();
        dump(&built, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "\
Number of units: 4
Number of vertices: 3
Number of levels: 3
Number of edges: 2

Level (0) degree 0
\t2;
Level (1) degree 1
\t1;
Level (2) degree 2
\t0;

Edges:
\t0 [110] --> 1;
\t1 [100] --> 2;
\t2 [000] -->

Index:
\t4\t0
\t5\t1
\t6\t2
\t7\t0
";
        assert_eq!(text, expected);
    }
}
