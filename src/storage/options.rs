use crate::types::{DsgError, Result};

use super::traversal::TraversalStrategy;

/// Default number of tests (bits per kill-vector).
pub const DEFAULT_TEST_COUNT: usize = 64;

/// Configuration supplied when building a graph from kill-vector input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Walk order used while searching for directly dominated clusters.
    pub strategy: TraversalStrategy,
    /// Number of tests, and therefore bits per kill-vector.
    pub test_count: usize,
    /// Identifier of the first test; test `k` maps to bit `k - bias`.
    pub bias: i64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strategy: TraversalStrategy::default(),
            test_count: DEFAULT_TEST_COUNT,
            bias: 0,
        }
    }
}

impl BuildOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the traversal strategy.
    pub fn strategy(mut self, strategy: TraversalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the number of tests.
    pub fn test_count(mut self, tests: usize) -> Self {
        self.test_count = tests;
        self
    }

    /// Sets the identifier of the first test.
    pub fn bias(mut self, bias: i64) -> Self {
        self.bias = bias;
        self
    }

    /// Rejects settings no input could be built with.
    pub fn validate(&self) -> Result<()> {
        if self.test_count == 0 {
            return Err(DsgError::InvalidArgument(
                "test count must be at least 1".into(),
            ));
        }
        if self.bias < 0 {
            return Err(DsgError::InvalidArgument(format!(
                "bias must not be negative (got {})",
                self.bias
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_chain() {
        let opts = BuildOptions::new()
            .strategy(TraversalStrategy::TopDown)
            .test_count(12)
            .bias(1);
        assert_eq!(opts.strategy, TraversalStrategy::TopDown);
        assert_eq!(opts.test_count, 12);
        assert_eq!(opts.bias, 1);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_vectors_and_negative_bias() {
        assert!(BuildOptions::new().test_count(0).validate().is_err());
        assert!(BuildOptions::new().bias(-1).validate().is_err());
    }
}
