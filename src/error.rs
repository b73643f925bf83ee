use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Decoding Errors
/// - [`Error::Malformed`] - Corrupted or invalid class-file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the input
/// - [`Error::Empty`] - Empty input provided
///
/// ## Constant Pool Errors
/// - [`Error::InvalidIndex`] - Pool index missing or of an unexpected kind
/// - [`Error::PoolOverflow`] - The pool would exceed the 65535 slots the format allows
///
/// ## Builder Errors
/// - [`Error::InvalidElement`] - An element was accepted by a builder that cannot hold it
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use classweave::{ClassFile, Error};
///
/// match ClassFile::new().parse(&[0xCA, 0xFE]) {
///     Ok(_) => println!("parsed"),
///     Err(Error::OutOfBounds { .. }) => println!("truncated input"),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// A constant pool index does not resolve, or resolves to a constant of the wrong kind.
    #[error("Invalid constant pool index - {0}")]
    InvalidIndex(u16),

    /// Interning would grow the constant pool beyond the 65535 slots a class file can address.
    ///
    /// The associated value is the slot count that was requested.
    #[error("Constant pool overflow - {0} slots requested")]
    PoolOverflow(usize),

    /// A builder received an element that is not valid in its context.
    ///
    /// For example a `SourceFile` attribute offered to a field builder, or a superclass
    /// element that does not reference a class constant.
    #[error("{element} is not valid in a {context}")]
    InvalidElement {
        /// Description of the offending element
        element: String,
        /// The kind of builder that rejected it
        context: &'static str,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
