use std::io::BufRead;

use tracing::trace;

use crate::primitives::bits::BitSequence;
use crate::storage::KillVector;
use crate::types::{Result, UnitId};

/// Turns result lines of the form `<unit> [<n>]: t<test> t<test> ...` into
/// kill-vectors.
///
/// Test `k` sets bit `k - bias` when `bias <= k < bias + test_count`; tests
/// outside that window are ignored. Whitespace between tokens is optional
/// and commas are accepted as separators. The bracketed count is parsed but
/// not checked against the listed tests.
#[derive(Clone, Debug)]
pub struct KillVectorParser {
    test_count: usize,
    bias: i64,
}

impl KillVectorParser {
    /// Creates a parser producing vectors of `test_count` bits.
    pub fn new(test_count: usize, bias: i64) -> Self {
        Self { test_count, bias }
    }

    /// Number of bits in every produced vector.
    pub fn test_count(&self) -> usize {
        self.test_count
    }

    /// Parses one line; blank or malformed lines yield `None`.
    pub fn parse(&self, line: &str) -> Option<KillVector> {
        let mut cur = Cursor::new(line);
        cur.skip_ws();
        if cur.at_end() {
            return None;
        }
        let unit = cur.integer()?;
        cur.expect(b'[')?;
        cur.integer()?;
        cur.expect(b']')?;
        cur.expect(b':')?;

        let mut vector = BitSequence::zeros(self.test_count);
        loop {
            cur.skip_separators();
            if cur.at_end() {
                break;
            }
            cur.expect_raw(b't')?;
            let test = cur.integer_raw()?;
            if let Some(bit) = self.bit_of(test) {
                vector.set(bit, true).ok()?;
            }
        }
        Some(KillVector::new(UnitId(unit), vector))
    }

    fn bit_of(&self, test: i64) -> Option<usize> {
        let offset = test.checked_sub(self.bias)?;
        let bit = usize::try_from(offset).ok()?;
        (bit < self.test_count).then_some(bit)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            bytes: line.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_whitespace() || b == b',')
        {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_ws();
        self.expect_raw(byte)
    }

    fn expect_raw(&mut self, byte: u8) -> Option<()> {
        if self.peek()? == byte {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn integer(&mut self) -> Option<i64> {
        self.skip_ws();
        self.integer_raw()
    }

    fn integer_raw(&mut self) -> Option<i64> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }
}

/// Counts kept while reading kill-vector input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestCounts {
    /// Lines read, blank and malformed ones included.
    pub lines: u64,
    /// Lines that produced a kill-vector.
    pub parsed: u64,
    /// Lines skipped as blank or malformed.
    pub skipped: u64,
}

/// Feeds every parsable line of `src` to `sink`, skipping the rest.
pub fn for_each_kill_vector<R, F>(
    src: R,
    parser: &KillVectorParser,
    mut sink: F,
) -> Result<IngestCounts>
where
    R: BufRead,
    F: FnMut(KillVector) -> Result<()>,
{
    let mut counts = IngestCounts::default();
    for line in src.lines() {
        let line = line?;
        counts.lines += 1;
        match parser.parse(&line) {
            Some(kill_vector) => {
                counts.parsed += 1;
                sink(kill_vector)?;
            }
            None => {
                counts.skipped += 1;
                if !line.trim().is_empty() {
                    trace!(line = counts.lines, "ingest.skip_malformed");
                }
            }
        }
    }
    Ok(counts)
}
