#![forbid(unsafe_code)]
//! Identifiers and the crate-wide error type.

use std::fmt;

/// Identifier of a cluster vertex, assigned sequentially as clusters are created.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VertexId(pub i64);

/// Identifier of an analysed unit (one input line), as supplied by the caller.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct UnitId(pub i64);

/// Errors raised while building, validating or persisting a subsumption graph.
///
/// Every variant is fatal for the operation that produced it; no partial
/// state is meant to be reused after an error.
#[derive(thiserror::Error, Debug)]
pub enum DsgError {
    /// Underlying I/O failure.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// A builder operation was invoked outside the state it requires.
    #[error("invalid state: {operation} is not allowed while {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the builder was in.
        state: &'static str,
    },
    /// A vertex id was registered twice.
    #[error("duplicate vertex {0}")]
    DuplicateVertex(VertexId),
    /// A unit id was registered twice.
    #[error("duplicate unit {0}")]
    DuplicateUnit(UnitId),
    /// Attempt to link a vertex to itself.
    #[error("self loop on vertex {0}")]
    SelfLoop(VertexId),
    /// A vertex id is not known where one was required.
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),
    /// A unit id is not known where one was required.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    /// Hierarchy level index past the number of levels.
    #[error("hierarchy level {level} out of range ({levels} levels)")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Number of levels present.
        levels: usize,
    },
    /// Bit index past the end of a bit sequence.
    #[error("bit {index} out of range for sequence of {len} bits")]
    BitOutOfRange {
        /// Requested bit.
        index: usize,
        /// Sequence length in bits.
        len: usize,
    },
    /// Two bit sequences of incompatible length were combined.
    #[error("bit length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the receiver.
        left: usize,
        /// Length of the argument.
        right: usize,
    },
    /// Persisted data does not follow the expected layout.
    #[error("corruption: {0}")]
    Corruption(String),
    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DsgError>;

impl DsgError {
    pub(crate) fn corruption(msg: impl Into<String>) -> Self {
        DsgError::Corruption(msg.into())
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VertexId {
    fn from(value: i64) -> Self {
        VertexId(value)
    }
}

impl From<VertexId> for i64 {
    fn from(value: VertexId) -> Self {
        value.0
    }
}

impl From<i64> for UnitId {
    fn from(value: i64) -> Self {
        UnitId(value)
    }
}

impl From<UnitId> for i64 {
    fn from(value: UnitId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let err = DsgError::InvalidState {
            operation: "sort_nodes",
            state: "closed",
        };
        assert_eq!(
            err.to_string(),
            "invalid state: sort_nodes is not allowed while closed"
        );
        assert_eq!(
            DsgError::DuplicateUnit(UnitId(7)).to_string(),
            "duplicate unit 7"
        );
    }
}
