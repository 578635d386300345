//! Little-endian field extraction from raw record and sector buffers.
//!
//! Every reader is bounds-checked: asking for bytes past the end of the
//! buffer yields [`BinaryError`] rather than a panic. The on-disk formats are
//! always little-endian, so the conversion is a no-op on little-endian hosts
//! and a byte swap elsewhere.

use thiserror::Error;
use zerocopy::{F64, FromBytes, I32, LE, U16, U32};

/// A fixed-size field did not fit into the buffer it was read from.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("need {needed} bytes at offset {offset}, buffer holds {available}")]
pub struct BinaryError {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

#[inline]
fn field(data: &[u8], offset: usize, needed: usize) -> Result<&[u8], BinaryError> {
    offset
        .checked_add(needed)
        .and_then(|end| data.get(offset..end))
        .ok_or(BinaryError {
            offset,
            needed,
            available: data.len(),
        })
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, BinaryError> {
    field(data, offset, 1).map(|b| b[0])
}

/// Read a little-endian u16 from a byte slice at the given offset.
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16, BinaryError> {
    let bytes = field(data, offset, 2)?;
    U16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| BinaryError {
            offset,
            needed: 2,
            available: data.len(),
        })
}

/// Read a little-endian u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, BinaryError> {
    let bytes = field(data, offset, 4)?;
    U32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| BinaryError {
            offset,
            needed: 4,
            available: data.len(),
        })
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> Result<i32, BinaryError> {
    let bytes = field(data, offset, 4)?;
    I32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| BinaryError {
            offset,
            needed: 4,
            available: data.len(),
        })
}

/// Read a little-endian IEEE-754 double from a byte slice at the given offset.
#[inline]
pub fn read_f64_le(data: &[u8], offset: usize) -> Result<f64, BinaryError> {
    let bytes = field(data, offset, 8)?;
    F64::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| BinaryError {
            offset,
            needed: 8,
            available: data.len(),
        })
}

/// Borrow `len` bytes starting at `offset`.
#[inline]
pub fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], BinaryError> {
    field(data, offset, len)
}

/// Decode a UTF-16LE byte run, stopping at the first NUL code unit.
///
/// Returns `None` when the run contains unpaired surrogates.
pub fn decode_utf16le(data: &[u8]) -> Option<String> {
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0);
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_le_values() {
        let data = [0x34, 0x12, 0x78, 0x56, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
        assert_eq!(read_u32_le(&data, 0).unwrap(), 0x5678_1234);
        assert_eq!(read_i32_le(&data, 4).unwrap(), -1);
        assert_eq!(read_u8(&data, 1).unwrap(), 0x12);
    }

    #[test]
    fn test_read_f64() {
        let data = 3.14f64.to_le_bytes();
        assert_eq!(read_f64_le(&data, 0).unwrap(), 3.14);
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0u8; 3];
        let err = read_u32_le(&data, 0).unwrap_err();
        assert_eq!(err.needed, 4);
        assert_eq!(err.available, 3);
        assert!(read_u16_le(&data, 2).is_err());
        assert!(read_u16_le(&data, usize::MAX).is_err());
        assert!(read_bytes(&data, 1, 2).is_ok());
    }

    #[test]
    fn test_decode_utf16le() {
        let data = [b'B', 0, b'o', 0, b'o', 0, b'k', 0, 0, 0, b'x', 0];
        assert_eq!(decode_utf16le(&data).as_deref(), Some("Book"));
        // Lone high surrogate
        assert_eq!(decode_utf16le(&[0x00, 0xD8]), None);
    }
}
