//! Low-level building blocks shared by the graph layers.
//!
//! Includes the packed bit vector, the bit trie used to collapse repeated
//! vectors, and the fixed-width field encoders behind the binary format.

/// Fixed-length packed bit vectors.
pub mod bits;

/// Little-endian field encoding over byte streams.
pub mod bytes;

/// Path-compressed binary trie keyed by bit vectors.
pub mod trie;
