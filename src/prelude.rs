//! # classweave Prelude
//!
//! Re-exports of the types and traits needed for everyday parsing, building and
//! transforming. `use classweave::prelude::*;` brings the builder and transform traits into
//! scope, which their provided methods require.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classweave operations
pub use crate::Error;

/// The result type used throughout classweave
pub use crate::Result;

/// Entry point for parsing, building and transforming
pub use crate::ClassFile;

/// Per-operation configuration
pub use crate::options::{AttributePolicy, ClassFileOptions, PoolSharing, UnknownAttributes};

/// Non-fatal findings
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

// ================================================================================================
// Constant Pool
// ================================================================================================

/// Decoded and append-only pools and their entries
pub use crate::pool::{Constant, ConstantPool, ConstantPoolBuilder, ConstantTag, PoolEntry};

// ================================================================================================
// Models and Elements
// ================================================================================================

/// Immutable models
pub use crate::model::{ClassModel, FieldModel, MethodModel};

/// Streamed elements
pub use crate::model::{ClassElement, FieldElement, MethodElement};

/// Access flags
pub use crate::model::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

/// Attributes
pub use crate::attribute::{Attribute, AttributeBody, AttributeKind, AttributeStability};

// ================================================================================================
// Builders
// ================================================================================================

/// The element sink trait and its implementations
pub use crate::builder::{
    BufferedFieldBuilder, BufferedMethodBuilder, ChainedClassBuilder, ClassBuilder,
    DirectClassBuilder,
};

// ================================================================================================
// Transforms
// ================================================================================================

/// Transform traits and composition
pub use crate::transform::{
    ClassTransform, ClassTransformChain, ClassTransformExt, FieldTransform, MethodTransform,
};

/// Closure adapters and combinators
pub use crate::transform::{
    dropping, ending_with, field_fn, from_fn, method_fn, pass_through, transforming_fields,
    transforming_methods,
};
