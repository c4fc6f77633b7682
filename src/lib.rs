//! Direct subsumption graphs over kill-vectors.
//!
//! Units (mutants) that are killed by exactly the same tests are merged into
//! one cluster. Clusters are then linked by direct subsumption: an edge
//! `a -> b` exists when `a`'s kill-vector strictly dominates `b`'s and no
//! third cluster sits strictly between them. The resulting graph, together
//! with its unit index and degree hierarchy, can be persisted to and reloaded
//! from a compact binary file.

#![warn(missing_docs)]

pub mod admin;
pub mod cli;
pub mod primitives;
pub mod storage;
pub mod types;
