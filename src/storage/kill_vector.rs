use crate::primitives::bits::BitSequence;
use crate::types::{Result, UnitId};

/// The tests that kill one unit, one bit per test.
///
/// `quantity` caches the population count of `vector` and becomes the degree
/// of the cluster vertex created for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KillVector {
    unit: UnitId,
    vector: BitSequence,
    quantity: u32,
}

impl KillVector {
    /// Wraps an already populated bit sequence.
    pub fn new(unit: UnitId, vector: BitSequence) -> Self {
        let quantity = vector.count_ones();
        Self {
            unit,
            vector,
            quantity,
        }
    }

    /// Builds a kill-vector of `test_count` bits with the listed tests set.
    pub fn from_kill_set<I>(unit: UnitId, test_count: usize, kill_set: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut vector = BitSequence::zeros(test_count);
        for test in kill_set {
            vector.set(test, true)?;
        }
        Ok(Self::new(unit, vector))
    }

    /// Identifier of the unit this vector describes.
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// The kill bits.
    pub fn vector(&self) -> &BitSequence {
        &self.vector
    }

    /// Number of tests killing the unit.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Number of tests (bits) in the vector.
    pub fn test_count(&self) -> usize {
        self.vector.len()
    }

    /// Whether at least one test kills the unit.
    pub fn is_killed(&self) -> bool {
        self.quantity > 0
    }
}
