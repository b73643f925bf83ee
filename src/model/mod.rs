//! Immutable class, field and method models and the elements they replay as.
//!
//! Models are what builders finalize into and what transformations read from. A model never
//! changes after construction; transforming one means replaying its elements into a fresh
//! builder.
//!
//! # Key Components
//!
//! - [`ClassModel`] - a decoded class with its shared constant pool
//! - [`FieldModel`] / [`MethodModel`] - finished members, optionally bound to their encoding
//! - [`ClassElement`] / [`FieldElement`] / [`MethodElement`] - the streamable units
//! - [`ClassAccessFlags`] / [`FieldAccessFlags`] / [`MethodAccessFlags`] - access flags

mod class;
mod element;
mod field;
mod flags;
mod method;
pub(crate) mod reader;

pub use class::ClassModel;
pub use element::{ClassElement, FieldElement, MethodElement};
pub use field::FieldModel;
pub use flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use method::MethodModel;
pub use reader::CLASS_MAGIC;

use std::sync::Arc;

use crate::pool::ConstantPool;

/// The exact `field_info`/`method_info` encoding of a decoded member and the pool it
/// references.
#[derive(Debug, Clone)]
pub(crate) struct RawMember {
    pub(crate) pool: Arc<ConstantPool>,
    pub(crate) bytes: Arc<[u8]>,
}
