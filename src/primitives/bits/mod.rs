#![forbid(unsafe_code)]
//! Fixed-length, byte-packed bit sequences.
//!
//! Bit `i` lives in byte `i / 8` under mask `1 << (i % 8)`. Padding bits past
//! the logical length are kept at zero so that byte-wise comparisons and the
//! raw byte view used by the codec never observe stale data.

use std::fmt;
use std::str::FromStr;

use crate::types::{DsgError, Result};

/// An ordered sequence of bits, one bit per test.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSequence {
    len: usize,
    bytes: Vec<u8>,
}

#[inline]
const fn bytes_for(len: usize) -> usize {
    len.div_ceil(8)
}

impl BitSequence {
    /// Creates an all-zero sequence of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            bytes: vec![0u8; bytes_for(len)],
        }
    }

    /// Builds a sequence from an iterator of bits, first item at index 0.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut seq = Self::default();
        for bit in bits {
            if seq.len % 8 == 0 {
                seq.bytes.push(0);
            }
            if bit {
                seq.bytes[seq.len / 8] |= 1 << (seq.len % 8);
            }
            seq.len += 1;
        }
        seq
    }

    /// Rebuilds a sequence of `len` bits from its raw bytes.
    ///
    /// `bytes` must hold exactly `ceil(len / 8)` bytes; padding bits are cleared.
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != bytes_for(len) {
            return Err(DsgError::LengthMismatch {
                left: bytes_for(len),
                right: bytes.len(),
            });
        }
        let mut seq = Self {
            len,
            bytes: bytes.to_vec(),
        };
        seq.clear_padding();
        Ok(seq)
    }

    /// Number of bits in the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes backing the sequence, `ceil(len / 8)`.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw bytes with padding bits zeroed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns bit `index`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.bit(index))
    }

    /// Sets bit `index` to `value`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check(index)?;
        let mask = 1u8 << (index % 8);
        if value {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
        Ok(())
    }

    /// Population count: number of bits set to one.
    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Indexes of the bits set to one, in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.bit(i))
    }

    /// Replaces `self` with the bitwise AND of `self` and `other`.
    ///
    /// Both sequences must have the same length.
    pub fn conjunct(&mut self, other: &BitSequence) -> Result<()> {
        if self.len != other.len {
            return Err(DsgError::LengthMismatch {
                left: self.len,
                right: other.len,
            });
        }
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst &= *src;
        }
        Ok(())
    }

    /// Superset test: every bit set in `other` is also set in `self`.
    ///
    /// Positions past the end of either sequence read as zero, so a set bit of
    /// `other` beyond `self.len()` makes the test fail.
    pub fn dominates(&self, other: &BitSequence) -> bool {
        other.bytes.iter().enumerate().all(|(i, &theirs)| {
            let ours = self.bytes.get(i).copied().unwrap_or(0);
            theirs & !ours == 0
        })
    }

    /// Extracts bits `[start, end)` as a new sequence.
    pub fn sub_range(&self, start: usize, end: usize) -> Result<BitSequence> {
        if start > end {
            return Err(DsgError::InvalidArgument(format!(
                "sub_range start {start} past end {end}"
            )));
        }
        if end > self.len {
            return Err(DsgError::BitOutOfRange {
                index: end,
                len: self.len,
            });
        }
        if start % 8 == 0 {
            let mut out = Self {
                len: end - start,
                bytes: self.bytes[start / 8..(start / 8) + bytes_for(end - start)].to_vec(),
            };
            out.clear_padding();
            return Ok(out);
        }
        Ok(Self::from_bits((start..end).map(|i| self.bit(i))))
    }

    /// Length of the longest run where `self[j] == other[offset + j]`, starting at `j = 0`.
    ///
    /// The run stops at the end of either sequence.
    pub fn common_prefix(&self, other: &BitSequence, offset: usize) -> usize {
        let limit = self.len.min(other.len.saturating_sub(offset));
        (0..limit)
            .find(|&j| self.bit(j) != other.bit(offset + j))
            .unwrap_or(limit)
    }

    /// First `n` bits, clamped to the sequence length.
    pub(crate) fn prefix(&self, n: usize) -> BitSequence {
        Self::from_bits((0..n.min(self.len)).map(|i| self.bit(i)))
    }

    /// Bits from `start` to the end, empty when `start >= len`.
    pub(crate) fn suffix(&self, start: usize) -> BitSequence {
        Self::from_bits((start.min(self.len)..self.len).map(|i| self.bit(i)))
    }

    /// Concatenation of `self` followed by `tail`.
    pub(crate) fn concat(&self, tail: &BitSequence) -> BitSequence {
        Self::from_bits(
            (0..self.len)
                .map(|i| self.bit(i))
                .chain((0..tail.len).map(|i| tail.bit(i))),
        )
    }

    #[inline]
    pub(crate) fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "bit index {index} >= {}", self.len);
        self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(DsgError::BitOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    fn clear_padding(&mut self) {
        let rem = self.len % 8;
        if rem != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSequence({self})")
    }
}

impl FromStr for BitSequence {
    type Err = DsgError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bits = Vec::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => {
                    return Err(DsgError::InvalidArgument(format!(
                        "unexpected character {other:?} in bit string"
                    )))
                }
            }
        }
        Ok(Self::from_bits(bits))
    }
}
