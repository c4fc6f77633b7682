#![forbid(unsafe_code)]

//! Reading kill-vector result files and running the build pipeline.
//!
//! This module turns line-oriented result files into kill-vectors and drives
//! them through the classify, sort, link and close phases of the builder.

/// Result-line parsing.
pub mod ingest;

/// The end-to-end build pipeline and graph file generation.
pub mod generate;

pub use generate::{
    build_from_kill_vectors, build_from_reader, default_output_path, generate, BuildOutcome,
    CliError, GenerateConfig, GenerateSummary, PhaseTimings, DEFAULT_OUTPUT_SUFFIX,
};
pub use ingest::{for_each_kill_vector, IngestCounts, KillVectorParser};
