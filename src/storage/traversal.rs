use std::collections::{btree_map, BTreeSet, VecDeque};
use std::fmt;
use std::iter::Peekable;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::types::{DsgError, VertexId};

use super::graph::Graph;
use super::vertex::Vertex;

/// Order in which the builder visits already-placed vertices.
///
/// The choice changes how many dominance tests get pruned, never the
/// resulting edge set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalStrategy {
    /// Breadth-first from the leafs along incoming edges.
    BottomUp,
    /// Breadth-first from the roots along outgoing edges.
    TopDown,
    /// Ascending vertex id order.
    #[default]
    Unordered,
}

impl TraversalStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [TraversalStrategy; 3] = [
        TraversalStrategy::BottomUp,
        TraversalStrategy::TopDown,
        TraversalStrategy::Unordered,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            TraversalStrategy::BottomUp => "bottom-up",
            TraversalStrategy::TopDown => "top-down",
            TraversalStrategy::Unordered => "unordered",
        }
    }
}

impl fmt::Display for TraversalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraversalStrategy {
    type Err = DsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom-up" | "bottomup" | "bottom_up" => Ok(TraversalStrategy::BottomUp),
            "top-down" | "topdown" | "top_down" => Ok(TraversalStrategy::TopDown),
            "unordered" | "default" => Ok(TraversalStrategy::Unordered),
            other => Err(DsgError::InvalidArgument(format!(
                "unknown traversal strategy '{other}'"
            ))),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Direction {
    Up,
    Down,
}

enum Walk<'g> {
    Breadth {
        direction: Direction,
        queue: VecDeque<VertexId>,
        seen: FxHashSet<VertexId>,
    },
    Unordered(Peekable<btree_map::Values<'g, VertexId, Vertex>>),
}

/// External iterator over the vertices of a graph in one strategy's order.
///
/// Every vertex reachable from the starting frontier is yielded exactly once.
pub struct Traversal<'g> {
    graph: &'g Graph,
    walk: Walk<'g>,
}

impl<'g> Traversal<'g> {
    /// Starts a walk over `graph`.
    pub fn new(graph: &'g Graph, strategy: TraversalStrategy) -> Self {
        let breadth = |direction: Direction, start: &BTreeSet<VertexId>| {
            Walk::Breadth {
                direction,
                queue: start.iter().copied().collect(),
                seen: start.iter().copied().collect(),
            }
        };
        let walk = match strategy {
            TraversalStrategy::BottomUp => breadth(Direction::Up, graph.leafs()),
            TraversalStrategy::TopDown => breadth(Direction::Down, graph.roots()),
            TraversalStrategy::Unordered => Walk::Unordered(graph.vertices().peekable()),
        };
        Self { graph, walk }
    }

    /// Whether another vertex remains.
    pub fn has_next(&mut self) -> bool {
        match &mut self.walk {
            Walk::Breadth { queue, .. } => !queue.is_empty(),
            Walk::Unordered(values) => values.peek().is_some(),
        }
    }
}

impl<'g> Iterator for Traversal<'g> {
    type Item = &'g Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.walk {
            Walk::Unordered(values) => values.next(),
            Walk::Breadth {
                direction,
                queue,
                seen,
            } => {
                let graph = self.graph;
                while let Some(id) = queue.pop_front() {
                    let Some(vertex) = graph.vertex(id) else {
                        continue;
                    };
                    let edges = match direction {
                        Direction::Up => vertex.in_edges(),
                        Direction::Down => vertex.out_edges(),
                    };
                    for edge in edges {
                        let next = match direction {
                            Direction::Up => edge.source(),
                            Direction::Down => edge.target(),
                        };
                        if seen.insert(next) {
                            queue.push_back(next);
                        }
                    }
                    return Some(vertex);
                }
                None
            }
        }
    }
}
