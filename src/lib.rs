// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # classweave
//!
//! A builder and transformation framework for JVM class files.
//!
//! `classweave` decodes class files into immutable models, builds new classes from a stream
//! of elements, and rewrites existing classes through chains of element-wise transforms.
//! Transformed classes reuse the constant pool of their source: untouched members and
//! attributes are copied byte for byte, and an identity transform reproduces its input
//! exactly.
//!
//! ## Features
//!
//! - **Constant pool reuse** - output pools extend the source pool by appending, so existing
//!   indices stay valid
//! - **Streaming builders** - classes are assembled from [`model::ClassElement`]s; fields
//!   and methods are built out-of-line and added as finished models
//! - **Composable transforms** - closures and combinators chain into flat pipelines
//! - **Attribute policies** - keep, drop or filter attributes by name, stability or predicate
//! - **Batch processing** - independent classes are transformed in parallel
//!
//! ## Quick Start
//!
//! ```rust
//! use classweave::prelude::*;
//!
//! let context = ClassFile::new();
//! let bytes = context.build("com/example/Point", |class| {
//!     class.with_interfaces(&["java/io/Serializable"])?;
//!     for name in ["x", "y"] {
//!         class.with_field(name, "I", &mut |field| {
//!             field.with_flags(FieldAccessFlags::PRIVATE | FieldAccessFlags::FINAL);
//!             Ok(())
//!         })?;
//!     }
//!     Ok(())
//! })?;
//!
//! // mark field x synthetic, leave everything else alone
//! let model = context.parse(&bytes)?;
//! let output = context.transform_class(
//!     &model,
//!     transforming_fields(field_fn(|field, element| {
//!         field.accept(element)?;
//!         if field.name() == "x" {
//!             field.with_attribute(Attribute::synthetic())?;
//!         }
//!         Ok(())
//!     })),
//! )?;
//!
//! let model = context.parse(&output)?;
//! assert_eq!(model.field("x").map(|f| f.attributes().len()), Some(1));
//! # Ok::<(), classweave::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`pool`] - constant pools: decoded ([`pool::ConstantPool`]) and append-only
//!   ([`pool::ConstantPoolBuilder`])
//! - [`attribute`] - attributes, their kinds and the per-member [`attribute::AttributeHolder`]
//! - [`model`] - immutable class, field and method models and the element types
//! - [`builder`] - the direct, chained and buffered builders
//! - [`transform`] - transform traits, combinators and chains
//! - [`options`] - attribute policies and pool sharing
//! - [`diagnostics`] - non-fatal findings collected while processing
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Decoding problems are reported as
//! [`Error::Malformed`], [`Error::OutOfBounds`] or [`Error::InvalidIndex`]; elements that
//! cannot be placed are rejected with [`Error::InvalidElement`]. Attributes dropped by
//! policy and pool-reuse fallbacks are not errors; they are recorded in
//! [`ClassFile::diagnostics`].

#[macro_use]
pub(crate) mod error;

pub mod attribute;
pub mod builder;
pub mod diagnostics;
pub mod model;
pub mod options;
pub mod pool;
pub mod prelude;
pub mod transform;

mod classfile;
pub(crate) mod file;

#[cfg(test)]
pub(crate) mod test;

pub use classfile::ClassFile;
pub use error::Error;

/// `Result<T, classweave::Error>`
pub type Result<T> = std::result::Result<T, Error>;
