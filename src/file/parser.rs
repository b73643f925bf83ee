//! Cursor-based byte parser for class-file decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over a
//! byte slice. It is the only way the reader touches input bytes, so every truncated structure
//! surfaces as [`crate::Error::OutOfBounds`] rather than a panic.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use crate::file::parser::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x41];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! assert_eq!(parser.read_be::<u16>()?, 0);
//! assert_eq!(parser.read_be::<u16>()?, 65);
//! assert!(!parser.has_more_data());
//! # Ok::<(), classweave::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ByteIO},
    Result,
};

/// A generic binary data parser for reading class-file structures.
///
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns true if there is unread data left.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: ByteIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Read `length` bytes and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Returns the bytes between `start` and the current position.
    ///
    /// Used to capture the exact encoding of a structure after it was decoded.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `start` lies after the current position.
    pub fn consumed_since(&self, start: usize) -> Result<&'a [u8]> {
        if start > self.position {
            return Err(out_of_bounds_error!());
        }
        Ok(&self.data[start..self.position])
    }

    /// Calculate the end position for reading `length` bytes, checking bounds.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data length.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        match self.position.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(out_of_bounds_error!()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_sequence() {
        let data = [0x00, 0x03, 0x61, 0x62, 0x63, 0x7F];
        let mut parser = Parser::new(&data);

        let len = parser.read_be::<u16>().unwrap();
        assert_eq!(len, 3);
        assert_eq!(parser.read_bytes(len as usize).unwrap(), b"abc");
        assert_eq!(parser.remaining(), 1);
        assert!(parser.has_more_data());
        assert_eq!(parser.read_be::<u8>().unwrap(), 0x7F);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn consumed_since_captures_span() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut parser = Parser::new(&data);
        parser.read_be::<u8>().unwrap();
        let start = parser.pos();
        parser.read_be::<u16>().unwrap();
        assert_eq!(parser.consumed_since(start).unwrap(), &[0x02, 0x03]);
        assert!(parser.consumed_since(10).is_err());
    }

    #[test]
    fn truncated_reads() {
        let data = [0x01];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_be::<u16>(),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(parser.read_bytes(2).is_err());
        assert!(parser.read_bytes(usize::MAX).is_err());
        assert_eq!(parser.pos(), 0);
    }
}
