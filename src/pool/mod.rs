//! Constant pool storage, deduplication and cross-pool reuse.
//!
//! The constant pool is the table every other part of a class file points into. This module
//! provides the two halves of its lifecycle:
//!
//! - [`ConstantPool`] - the immutable pool of a decoded class, shared by `Arc` between the
//!   class model and every builder that extends it
//! - [`ConstantPoolBuilder`] - the append-only, deduplicating pool of one build, optionally
//!   extending a [`ConstantPool`]
//!
//! Entries are addressed through [`PoolEntry`], which pairs a structural [`Constant`] with its
//! index and the [`PoolId`] of the pool it came from.
//!
//! # Reuse
//!
//! Bytes encoded against one pool (attribute payloads, whole member encodings) can be copied
//! into the output unchanged only when every index they may contain resolves to an equal
//! constant in the output pool. [`ConstantPoolBuilder::can_write_direct`] answers that question
//! conservatively: the source pool must be a prefix of the builder. Extending a decoded pool
//! satisfies it by construction.
//!
//! # Examples
//!
//! ```rust
//! use classweave::pool::ConstantPoolBuilder;
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let field = pool.field_ref_entry("com/example/Point", "x", "I")?;
//! assert_eq!(pool.field_ref_entry("com/example/Point", "x", "I")?, field);
//! assert!(pool.size() > 1);
//! # Ok::<(), classweave::Error>(())
//! ```

mod builder;
mod constant;
mod entry;
mod store;

pub use builder::ConstantPoolBuilder;
pub use constant::{Constant, ConstantTag, MemberRef};
pub use entry::{PoolEntry, PoolId};
pub use store::ConstantPool;
