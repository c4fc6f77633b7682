#![forbid(unsafe_code)]
//! Fixed-width little-endian field encoding over byte streams.
//!
//! Readers turn a premature end of stream into [`DsgError::Corruption`]
//! naming the field that was cut short; other I/O failures pass through.

use std::io::{self, Read, Write};

use crate::types::{DsgError, Result};

/// Writes a `u32` in little-endian order.
pub fn write_u32_le<W: Write>(dst: &mut W, v: u32) -> Result<()> {
    dst.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Writes an `i64` in little-endian order.
pub fn write_i64_le<W: Write>(dst: &mut W, v: i64) -> Result<()> {
    dst.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Reads a little-endian `u32`.
pub fn read_u32_le<R: Read>(src: &mut R, field: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(src, &mut buf, field)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads a little-endian `i64`.
pub fn read_i64_le<R: Read>(src: &mut R, field: &str) -> Result<i64> {
    let mut buf = [0u8; 8];
    read_exact(src, &mut buf, field)?;
    Ok(i64::from_le_bytes(buf))
}

/// Fills `buf` completely from `src`.
pub fn read_exact<R: Read>(src: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    src.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            DsgError::corruption(format!("truncated while reading {field}"))
        }
        _ => DsgError::Io(err),
    })
}

/// Reads exactly `len` bytes into a new buffer that grows only as data
/// arrives, so a corrupt length cannot force a large allocation up front.
pub fn read_bytes<R: Read>(src: &mut R, len: usize, field: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    src.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(DsgError::corruption(format!(
            "truncated while reading {field}: {} of {len} bytes",
            buf.len()
        )));
    }
    Ok(buf)
}

/// Converts a length to the `u32` used on disk.
pub fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| DsgError::InvalidArgument(format!("{what} {len} exceeds u32 range")))
}
