#![forbid(unsafe_code)]

//! Inspection utilities for persisted subsumption graphs.
//!
//! This module provides the reporting side of the tool: headline statistics
//! and pair counts, consistency verification, and a textual dump.

mod dump;
mod error;
mod stats;
mod util;
mod verify;

/// Textual listing of a graph.
pub use dump::{dump, dump_file};

/// Error types for inspection commands.
pub use error::{AdminError, Result};

/// Statistics collection and reporting.
///
/// Headline counts and the pair counts that show how much clustering and
/// pruning saved over naive all-pairs comparison.
pub use stats::{efficiency, stats, summarize, EfficiencyReport, StatsReport, SummaryReport};

/// Graph consistency verification.
pub use verify::{
    verify, verify_graph, VerifyCounts, VerifyFinding, VerifyLevel, VerifyReport, VerifySeverity,
};

/// Loads a graph file for inspection.
pub use util::open_graph;
