//! Byte-level access to class-file data.
//!
//! Class files are big-endian throughout. This module provides the primitives the
//! [`crate::model::reader`] decodes with and the writers in [`crate::builder`] encode with.
//!
//! # Key Components
//!
//! - [`crate::file::io::ByteIO`] - Endian-aware conversion trait for primitive types
//! - [`crate::file::io::read_be_at`] / [`crate::file::io::write_be`] - bounds-checked primitives
//! - [`crate::file::parser::Parser`] - Cursor-based reader over a byte slice

pub mod io;
pub mod parser;
