//! Cursor-based byte parser for fixed-layout PE records.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over
//! a byte slice. Every PE decoder in [`crate::pe`] reads its records through a `Parser`, either
//! over the whole file buffer or over a directory's byte range resolved through the address
//! space.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::read_le_dyn`] - Read a 4- or 8-byte value widened to `u64`
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a fixed number of bytes
//! - [`crate::file::parser::Parser::read_cstring`] - Read a NUL-terminated string
//!
//! # Usage Examples
//!
//! ```rust
//! use pescope::Parser;
//!
//! let data = [0x00, 0x10, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00];
//! let mut parser = Parser::new(&data);
//!
//! let page_rva = parser.read_le::<u32>()?;
//! let block_size = parser.read_le::<u32>()?;
//! assert_eq!((page_rva, block_size), (0x1000, 12));
//! assert!(!parser.has_more_data());
//! # Ok::<(), pescope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, read_le_at_dyn, PeIO},
    Error, Result,
};

/// A generic binary data parser for reading PE structures.
///
/// `Parser` maintains an internal position cursor and checks bounds on every read, so
/// malformed or truncated input surfaces as [`crate::Error::Truncated`] instead of a panic.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the cursor has not yet reached the end of the data.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the cursor to an absolute position.
    ///
    /// Seeking to exactly the end of the data is allowed; reads from there fail.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if `pos` lies beyond the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.truncated_at(pos, 0));
        }

        self.position = pos;
        Ok(())
    }

    /// Move the cursor forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.ensure_remaining(step)?;
        self.position += step;
        Ok(())
    }

    /// Returns the current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the complete underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Read a little-endian value of type `T` and advance the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the value does not fit in the remaining data.
    pub fn read_le<T: PeIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a 4-byte (`is_64bit == false`) or 8-byte little-endian value widened to `u64`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the value does not fit in the remaining data.
    pub fn read_le_dyn(&mut self, is_64bit: bool) -> Result<u64> {
        read_le_at_dyn(self.data, &mut self.position, is_64bit)
    }

    /// Read a NUL-terminated string and advance the cursor past the terminator.
    ///
    /// A string running to the end of the data without a terminator is accepted as-is. Bytes
    /// that are not valid UTF-8 are replaced with `U+FFFD`; PE name fields are nominally ASCII
    /// but malformed images must still decode.
    ///
    /// ```rust
    /// use pescope::Parser;
    ///
    /// let data = b"KERNEL32.dll\0USER32.dll\0";
    /// let mut parser = Parser::new(data);
    ///
    /// assert_eq!(parser.read_cstring(), "KERNEL32.dll");
    /// assert_eq!(parser.read_cstring(), "USER32.dll");
    /// ```
    pub fn read_cstring(&mut self) -> String {
        let start = self.position;
        let remaining = &self.data[start..];

        let (string_data, consumed) = match remaining.iter().position(|&b| b == 0) {
            Some(nul) => (&remaining[..nul], nul + 1),
            None => (remaining, remaining.len()),
        };

        self.position += consumed;
        String::from_utf8_lossy(string_data).into_owned()
    }

    /// Returns the number of bytes between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check that at least `needed` bytes remain without moving the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(self.truncated_at(self.position, needed));
        }
        Ok(())
    }

    /// Borrow the next `length` bytes and advance the cursor past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(length)?;
        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    fn truncated_at(&self, offset: usize, needed: usize) -> Error {
        Error::Truncated {
            offset,
            needed,
            available: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sequence() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u32>().unwrap(), 0x0403_0201);
        parser.seek(6).unwrap();
        assert_eq!(parser.read_le::<u16>().unwrap(), 0x0807);
        assert!(!parser.has_more_data());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut parser = Parser::new(&data);

        assert!(parser.seek(4).is_ok());
        assert!(matches!(parser.seek(5), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_read_bytes() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert!(matches!(
            parser.read_bytes(2),
            Err(Error::Truncated {
                offset: 2,
                needed: 2,
                available: 3
            })
        ));
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn test_read_cstring() {
        let data = b"abc\0de";
        let mut parser = Parser::new(data);

        assert_eq!(parser.read_cstring(), "abc");
        assert_eq!(parser.pos(), 4);
        // No terminator, runs to the end of the data
        assert_eq!(parser.read_cstring(), "de");
        assert_eq!(parser.pos(), 6);
        assert_eq!(parser.read_cstring(), "");
    }

    #[test]
    fn test_read_cstring_lossy() {
        let data = [b'a', 0xFF, b'b', 0x00];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_cstring(), "a\u{FFFD}b");
    }

    #[test]
    fn test_error_handling() {
        let data = [0x01];
        let mut parser = Parser::new(&data);

        assert!(parser.read_le::<u32>().is_err());
        assert!(parser.advance_by(2).is_err());
        assert!(parser.ensure_remaining(1).is_ok());
    }
}
