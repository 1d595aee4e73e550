//! Low-level little-endian reading utilities for PE parsing.
//!
//! This module provides bounds-checked reads of primitive integers from byte buffers. Every
//! multi-byte field in a PE/COFF image is little-endian, so only little-endian readers exist
//! here. All reads either return the decoded value or [`crate::Error::Truncated`], which
//! carries the failing offset, the number of bytes the read required and the buffer size.
//!
//! # Key Components
//!
//! - [`crate::file::io::PeIO`] - Trait mapping a primitive type to its fixed-size byte array
//! - [`crate::file::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//! - [`crate::file::io::read_le_at_dyn`] - Read a 4- or 8-byte value widened to `u64`
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use pescope::file::io::{read_le, read_le_at};
//!
//! let data = [0x4C, 0x01, 0x03, 0x00];
//! let machine: u16 = read_le(&data)?;
//! assert_eq!(machine, 0x014C);
//!
//! let mut offset = 2;
//! let sections: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!(sections, 3);
//! assert_eq!(offset, 4);
//! # Ok::<(), pescope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All functions are pure and operate on caller-provided buffers, so they can be called
//! concurrently from multiple threads.

use crate::{Error::Truncated, Result};

/// Trait for type-specific safe binary data reading, implemented for the unsigned widths PE
/// fields use.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size byte
/// array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait PeIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

// Implement PeIO support for u64
impl PeIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

// Implement PeIO support for u32
impl PeIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

// Implement PeIO support from u16
impl PeIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

// Implement PeIO support from u8
impl PeIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }
}

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
///
/// # Errors
///
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_le<T: PeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the size of `T` on success and left untouched on failure.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use pescope::file::io::read_le_at;
///
/// let data = [0x01, 0x00, 0x02, 0x00];
/// let mut offset = 0;
///
/// let first: u16 = read_le_at(&data, &mut offset)?;
/// let second: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!((first, second, offset), (1, 2, 4));
/// # Ok::<(), pescope::Error>(())
/// ```
pub fn read_le_at<T: PeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let truncated = Truncated {
        offset: *offset,
        needed: type_len,
        available: data.len(),
    };

    let Some(end) = offset.checked_add(type_len) else {
        return Err(truncated);
    };
    if end > data.len() {
        return Err(truncated);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(truncated);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Dynamically reads either a 4-byte or 8-byte value in little-endian byte order.
///
/// Import lookup and address table entries are 4 bytes wide in PE32 images and 8 bytes wide
/// in PE32+ images; this reader returns both widened to `u64`.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
/// * `is_64bit` - If `true`, reads 8 bytes; otherwise reads 4 bytes and widens
///
/// # Errors
///
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_64bit: bool) -> Result<u64> {
    let res = if is_64bit {
        read_le_at::<u64>(data, offset)?
    } else {
        u64::from(read_le_at::<u32>(data, offset)?)
    };

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u8() {
        let result = read_le::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_le_u16() {
        let result = read_le::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_le_u32() {
        let result = read_le::<u32>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0403_0201);
    }

    #[test]
    fn read_le_u64() {
        let result = read_le::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0807_0605_0403_0201);
    }

    #[test]
    fn read_le_at_advances() {
        let mut offset = 2;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x0605_0403);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_le_at_dyn_widths() {
        let mut offset = 0;
        let small = read_le_at_dyn(&TEST_BUFFER, &mut offset, false).unwrap();
        assert_eq!(small, 0x0403_0201);
        assert_eq!(offset, 4);

        let mut offset = 0;
        let large = read_le_at_dyn(&TEST_BUFFER, &mut offset, true).unwrap();
        assert_eq!(large, 0x0807_0605_0403_0201);
        assert_eq!(offset, 8);
    }

    #[test]
    fn errors() {
        let buffer = [0xFF, 0xFF, 0xFF, 0xFF];

        let result = read_le::<u64>(&buffer);
        assert!(matches!(
            result,
            Err(Truncated {
                offset: 0,
                needed: 8,
                available: 4
            })
        ));
    }

    #[test]
    fn offset_untouched_on_failure() {
        let mut offset = 6;
        assert!(read_le_at::<u32>(&TEST_BUFFER, &mut offset).is_err());
        assert_eq!(offset, 6);
    }

    #[test]
    fn offset_overflow() {
        let mut offset = usize::MAX;
        assert!(matches!(
            read_le_at::<u16>(&TEST_BUFFER, &mut offset),
            Err(Truncated { .. })
        ));
    }
}
