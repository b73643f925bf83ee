//! Low-level byte order and safe reading/writing utilities for class-file data.
//!
//! The module is built around the [`crate::file::io::ByteIO`] trait which provides a unified
//! interface for converting primitive types from and to their big-endian byte representation.
//! Reads are bounds-checked against the input slice; writes append to a growable buffer, since
//! class files are always produced front to back.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use crate::file::io::{read_be_at, write_be};
//!
//! let mut out = Vec::new();
//! write_be(&mut out, 0xCAFE_BABEu32);
//! write_be(&mut out, 65u16);
//!
//! let mut offset = 0;
//! assert_eq!(read_be_at::<u32>(&out, &mut offset)?, 0xCAFE_BABE);
//! assert_eq!(read_be_at::<u16>(&out, &mut offset)?, 65);
//! # Ok::<(), classweave::Error>(())
//! ```

use crate::Result;

/// Trait for primitive types that can be read from and written to big-endian byte buffers.
///
/// # Thread Safety
///
/// All implementations are pure conversions without shared state.
pub trait ByteIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_byte_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ByteIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_byte_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order from a data buffer at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

/// Appends `value` in big-endian byte order to `out`.
pub fn write_be<T: ByteIO>(out: &mut Vec<u8>, value: T) {
    out.extend_from_slice(value.to_be_bytes().as_ref());
}

/// Appends a `u16` item count, as used before every table in a class file.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if `count` does not fit the 16-bit field.
pub fn write_count(out: &mut Vec<u8>, count: usize, what: &str) -> Result<()> {
    let Ok(count) = u16::try_from(count) else {
        return Err(malformed_error!("Too many {}: {}", what, count));
    };
    write_be(out, count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_be_sequential() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x41, 0xFF];
        let mut offset = 0;

        assert_eq!(read_be_at::<u32>(&data, &mut offset).unwrap(), 0xCAFE_BABE);
        assert_eq!(offset, 4);
        assert_eq!(read_be_at::<u16>(&data, &mut offset).unwrap(), 0x41);
        assert_eq!(read_be_at::<i8>(&data, &mut offset).unwrap(), -1);
        assert_eq!(offset, 7);
    }

    #[test]
    fn read_be_out_of_bounds() {
        let data = [0x01, 0x02, 0x03];
        let mut offset = 0;

        let result = read_be_at::<u32>(&data, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(offset, 0);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&data, &mut offset).is_err());
    }

    #[test]
    fn write_be_values() {
        let mut out = Vec::new();
        write_be(&mut out, 0x0123_4567_89AB_CDEFu64);
        write_be(&mut out, -2i16);
        assert_eq!(
            out,
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn write_count_limits() {
        let mut out = Vec::new();
        write_count(&mut out, 0x1234, "fields").unwrap();
        assert_eq!(out, [0x12, 0x34]);
        assert!(matches!(
            write_count(&mut out, 70_000, "fields"),
            Err(Error::Malformed { .. })
        ));
        assert_eq!(out.len(), 2);
    }
}
